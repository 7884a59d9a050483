mod cases;

test_case!(
    power_is_right_associative,
    input: ":calc 2^3^2",
    output: Ok("512"),
);

test_case!(
    implicit_multiplication,
    input: ":calc 3(1+2)",
    output: Ok("9"),
);

test_case!(
    integer_division,
    input: ":calc (7 \\ 2) (7 % 2)",
    output: Ok("3 1"),
);

test_case!(
    unary_minus,
    input: ":calc -3+1",
    output: Ok("-2"),
);

test_case!(
    division_by_zero,
    input: ":calc 1/0",
    output: Err(vec!["R001: division by zero"]),
);

test_case!(
    string_concatenation,
    input: ":calc \"ab\"+\"cd\"",
    output: Ok("\"abcd\""),
);

test_case!(
    string_reverse,
    input: ":calc !\"stressed\"",
    output: Ok("\"desserts\""),
);

test_case!(
    list_concatenation,
    input: ":calc {1}+{2, 3}",
    output: Ok("{1, 2, 3}"),
);

test_case!(
    nested_list,
    input: ":calc {{1, 2}, {3}}[0]",
    output: Ok("{1, 2}"),
);

test_case!(
    string_index,
    input: ":calc \"abc\"[2]",
    output: Ok("\"c\""),
);

test_case!(
    stepped_range,
    input: ":calc 1..10$3 10..1$-3",
    output: Ok("{1, 4, 7, 10} {10, 7, 4, 1}"),
);

test_case!(
    zero_step,
    input: ":calc 1..5$0",
    output: Err(vec!["R004: range step must not be zero"]),
);

test_case!(
    timespans,
    input: ":calc 1h+30m 2*1h",
    output: Ok("1h30m 2h"),
);

test_case!(
    date_arithmetic,
    input: ":calc 28.02.2024+1d",
    output: Ok("29.02.2024"),
);

test_case!(
    radix,
    input: ":calc 0x16:255 0x2:5",
    output: Ok("\"ff\" \"101\""),
);

test_case!(
    comparisons,
    input: ":calc 1<2 \"a\">=\"b\" {1}=={1}",
    output: Ok("true false true"),
);

test_case!(
    logic,
    input: ":calc (true && !false) (true xor true)",
    output: Ok("true false"),
);

test_case!(
    bit_shift,
    input: ":calc 1<<3 (6 & 3)",
    output: Ok("8 2"),
);

test_case!(
    conditional,
    input: ":calc if 1<2 : \"yes\" : \"no\"",
    output: Ok("\"yes\""),
);

test_case!(
    conditional_is_lazy,
    input: ":calc if true : 1 : 1/0",
    output: Ok("1"),
);

test_case!(
    native_functions,
    input: ":calc len(1..10) sqrt(16) max(3, 9) upper(\"quip\")",
    output: Ok("10 4 9 \"QUIP\""),
);

test_case!(
    overloaded_native,
    input: ":calc contains(\"abc\", \"bc\") contains({1, 2}, 3)",
    output: Ok("true false"),
);
