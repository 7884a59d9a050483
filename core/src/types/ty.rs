use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use hashbrown::{HashMap, HashSet};

pub type TypeVarId = u32;

static NEXT_TYPE_VAR: AtomicU32 = AtomicU32::new(0);

/// Built-in value types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Primitive {
    Num,
    String,
    Bool,
    Date,
    Timespan,
    Channel,
    User,
    Help,
    Void,
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Num => "num",
            Primitive::String => "string",
            Primitive::Bool => "bool",
            Primitive::Date => "date",
            Primitive::Timespan => "timespan",
            Primitive::Channel => "channel",
            Primitive::User => "user",
            Primitive::Help => "help",
            Primitive::Void => "void",
        }
    }

    pub fn from_name(name: &str) -> Option<Primitive> {
        Some(match name {
            "num" => Primitive::Num,
            "string" => Primitive::String,
            "bool" => Primitive::Bool,
            "date" => Primitive::Date,
            "timespan" => Primitive::Timespan,
            "channel" => Primitive::Channel,
            "user" => Primitive::User,
            "help" => Primitive::Help,
            _ => return None,
        })
    }
}

/// Structural type representation.
///
/// Equality is structural. `Map` is the function type; its source is the
/// parameter list, the same shape a `Product` describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(Primitive),
    List(Box<Type>),
    Product(Vec<Type>),
    Map { source: Vec<Type>, target: Box<Type> },
    Var(TypeVarId),
    /// Placeholder for a type that could not be resolved.
    Missing(String),
    /// Sentinel for expressions that have not been resolved yet.
    Unknown,
}

impl Type {
    pub fn num() -> Type {
        Type::Primitive(Primitive::Num)
    }
    pub fn string() -> Type {
        Type::Primitive(Primitive::String)
    }
    pub fn bool() -> Type {
        Type::Primitive(Primitive::Bool)
    }
    pub fn date() -> Type {
        Type::Primitive(Primitive::Date)
    }
    pub fn timespan() -> Type {
        Type::Primitive(Primitive::Timespan)
    }
    pub fn channel() -> Type {
        Type::Primitive(Primitive::Channel)
    }
    pub fn user() -> Type {
        Type::Primitive(Primitive::User)
    }
    pub fn help() -> Type {
        Type::Primitive(Primitive::Help)
    }
    pub fn void() -> Type {
        Type::Primitive(Primitive::Void)
    }

    /// Mints a type variable that has never been handed out before.
    pub fn fresh_var() -> Type {
        Type::Var(NEXT_TYPE_VAR.fetch_add(1, Ordering::Relaxed))
    }

    pub fn list_of(self) -> Type {
        Type::List(Box::new(self))
    }

    pub fn map(source: Vec<Type>, target: Type) -> Type {
        Type::Map {
            source,
            target: Box::new(target),
        }
    }

    /// Builds a function type from this product (or single type) to `target`.
    pub fn map_to(self, target: Type) -> Type {
        match self {
            Type::Product(source) => Type::map(source, target),
            other => Type::map(vec![other], target),
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Type::Map { .. })
    }

    /// Whether a function type occurs anywhere in this type, as in
    /// `list<(num -> num)>`.
    pub fn contains_map(&self) -> bool {
        match self {
            Type::Map { .. } => true,
            Type::List(t) => t.contains_map(),
            Type::Product(ts) => ts.iter().any(Type::contains_map),
            Type::Primitive(_) | Type::Var(_) | Type::Missing(_) | Type::Unknown => false,
        }
    }

    /// Whether a `Missing` placeholder occurs anywhere in this type.
    pub fn is_missing(&self) -> bool {
        match self {
            Type::Missing(_) | Type::Unknown => true,
            Type::List(t) => t.is_missing(),
            Type::Product(ts) => ts.iter().any(Type::is_missing),
            Type::Map { source, target } => {
                source.iter().any(Type::is_missing) || target.is_missing()
            }
            Type::Primitive(_) | Type::Var(_) => false,
        }
    }

    pub fn has_vars(&self) -> bool {
        match self {
            Type::Var(_) => true,
            Type::List(t) => t.has_vars(),
            Type::Product(ts) => ts.iter().any(Type::has_vars),
            Type::Map { source, target } => source.iter().any(Type::has_vars) || target.has_vars(),
            Type::Primitive(_) | Type::Missing(_) | Type::Unknown => false,
        }
    }

    pub fn free_vars(&self) -> HashSet<TypeVarId> {
        let mut vars = HashSet::new();
        self.collect_vars(&mut vars);
        vars
    }

    fn collect_vars(&self, vars: &mut HashSet<TypeVarId>) {
        match self {
            Type::Var(id) => {
                vars.insert(*id);
            }
            Type::List(t) => t.collect_vars(vars),
            Type::Product(ts) => ts.iter().for_each(|t| t.collect_vars(vars)),
            Type::Map { source, target } => {
                source.iter().for_each(|t| t.collect_vars(vars));
                target.collect_vars(vars);
            }
            Type::Primitive(_) | Type::Missing(_) | Type::Unknown => {}
        }
    }

    /// Type variables in order of first occurrence, left to right.
    fn vars_in_order(&self, order: &mut Vec<TypeVarId>) {
        match self {
            Type::Var(id) => {
                if !order.contains(id) {
                    order.push(*id);
                }
            }
            Type::List(t) => t.vars_in_order(order),
            Type::Product(ts) => ts.iter().for_each(|t| t.vars_in_order(order)),
            Type::Map { source, target } => {
                source.iter().for_each(|t| t.vars_in_order(order));
                target.vars_in_order(order);
            }
            Type::Primitive(_) | Type::Missing(_) | Type::Unknown => {}
        }
    }

    /// Returns a copy with every type variable replaced by a fresh one.
    /// Occurrences of the same variable map to the same fresh variable.
    pub fn fresh_instance(&self) -> Type {
        let mut renaming = HashMap::new();
        self.rename(&mut renaming)
    }

    fn rename(&self, renaming: &mut HashMap<TypeVarId, Type>) -> Type {
        match self {
            Type::Var(id) => renaming.entry(*id).or_insert_with(Type::fresh_var).clone(),
            Type::List(t) => Type::List(Box::new(t.rename(renaming))),
            Type::Product(ts) => Type::Product(ts.iter().map(|t| t.rename(renaming)).collect()),
            Type::Map { source, target } => Type::Map {
                source: source.iter().map(|t| t.rename(renaming)).collect(),
                target: Box::new(target.rename(renaming)),
            },
            other => other.clone(),
        }
    }
}

/// Type variables are shown as `A`, `B`, ... in order of first occurrence.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut order = Vec::new();
        self.vars_in_order(&mut order);
        self.write_with(f, &order)
    }
}

fn var_name(index: usize) -> String {
    let letter = char::from(b'A' + (index % 26) as u8);
    match index / 26 {
        0 => letter.to_string(),
        round => format!("{}{}", letter, round),
    }
}

impl Type {
    fn write_with(&self, f: &mut fmt::Formatter<'_>, vars: &[TypeVarId]) -> fmt::Result {
        match self {
            Type::Primitive(p) => f.write_str(p.name()),
            Type::List(t) => {
                write!(f, "list<")?;
                t.write_with(f, vars)?;
                write!(f, ">")
            }
            Type::Product(ts) => {
                write!(f, "(")?;
                for (i, t) in ts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    t.write_with(f, vars)?;
                }
                write!(f, ")")
            }
            Type::Map { source, target } => {
                write!(f, "(")?;
                for t in source {
                    t.write_with(f, vars)?;
                    write!(f, " ")?;
                }
                write!(f, "-> ")?;
                target.write_with(f, vars)?;
                write!(f, ")")
            }
            Type::Var(id) => match vars.iter().position(|v| v == id) {
                Some(index) => f.write_str(&var_name(index)),
                None => write!(f, "_{}", id),
            },
            Type::Missing(name) => write!(f, "{}?", name),
            Type::Unknown => write!(f, "?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_variables_by_occurrence() {
        let a = Type::fresh_var();
        let b = Type::fresh_var();
        let ty = Type::map(vec![b.clone(), a.clone().list_of()], b.clone());
        assert_eq!(ty.to_string(), "(A list<B> -> A)");
        assert_eq!(Type::map(vec![], Type::num()).to_string(), "(-> num)");

        // The same shape built from other variables prints the same
        let c = Type::fresh_var();
        let d = Type::fresh_var();
        assert_eq!(Type::map(vec![c.clone(), d.list_of()], c).to_string(), ty.to_string());
    }

    #[test]
    fn test_contains_map() {
        let function = Type::map(vec![Type::num()], Type::num());
        assert!(function.contains_map());
        assert!(function.clone().list_of().list_of().contains_map());
        assert!(Type::Product(vec![Type::num(), function]).contains_map());
        assert!(!Type::num().list_of().contains_map());
        assert!(!Type::fresh_var().contains_map());
    }
}
