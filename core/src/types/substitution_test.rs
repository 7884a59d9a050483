use super::{Substitution, Type};

#[test]
fn test_subst_follows_chains() {
    let a = Type::fresh_var();
    let b = Type::fresh_var();
    let Type::Var(a_id) = a else { unreachable!() };
    let Type::Var(b_id) = b.clone() else { unreachable!() };

    let subst = Substitution::singleton(a_id, b)
        .join(&Substitution::singleton(b_id, Type::num()))
        .unwrap();

    assert_eq!(subst.subst(&a), Type::num());
    assert_eq!(subst.subst(&a.clone().list_of()), Type::num().list_of());
}

#[test]
fn test_subst_leaves_unbound_vars() {
    let a = Type::fresh_var();
    let subst = Substitution::new();
    assert_eq!(subst.subst(&a), a);
}

#[test]
fn test_join_compatible() {
    let a = Type::fresh_var();
    let Type::Var(id) = a else { unreachable!() };
    let s1 = Substitution::singleton(id, Type::num());
    let s2 = Substitution::singleton(id, Type::num());
    let joined = s1.join(&s2).unwrap();
    assert_eq!(joined.subst(&a), Type::num());
}

#[test]
fn test_join_conflicting() {
    let a = Type::fresh_var();
    let Type::Var(id) = a else { unreachable!() };
    let s1 = Substitution::singleton(id, Type::num());
    let s2 = Substitution::singleton(id, Type::string());
    assert!(s1.join(&s2).is_err());
}

#[test]
fn test_join_refines_var_binding() {
    let a = Type::fresh_var();
    let b = Type::fresh_var();
    let Type::Var(a_id) = a else { unreachable!() };
    let s1 = Substitution::singleton(a_id, b.clone().list_of());
    let s2 = Substitution::singleton(a_id, Type::user().list_of());
    let joined = s1.join(&s2).unwrap();
    assert_eq!(joined.subst(&a), Type::user().list_of());
    assert_eq!(joined.subst(&b), Type::user());
}

#[test]
fn test_fresh_instance_renames_consistently() {
    let a = Type::fresh_var();
    let f = Type::map(vec![a.clone(), a.clone()], a.clone());
    let Type::Map { source, target } = f.fresh_instance() else {
        unreachable!()
    };
    assert_ne!(source[0], a);
    assert_eq!(source[0], source[1]);
    assert_eq!(source[0], *target);
}
