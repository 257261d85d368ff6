mod common;

use common::output;
use pretty_assertions::assert_eq;

#[test]
fn if_else() {
    assert_eq!(
        "yes\nno\nskipped\n",
        output(r#"
            if (1) print "yes"; else print "no";
            if (nil) print "yes"; else print "no";
            if (false) print "never";
            print "skipped";
        "#)
    );
}

#[test]
fn dangling_else_binds_to_the_nearest_if() {
    assert_eq!("inner else\n", output(r#"if (true) if (false) print "no"; else print "inner else";"#));
}

#[test]
fn while_loops() {
    assert_eq!("0\n1\n2\n", output("var i = 0; while (i < 3) { print i; i = i + 1; }"));
}

#[test]
fn for_loops_match_their_while_desugaring() {
    let for_loop = output("for (var i = 0; i < 3; i = i + 1) print i;");
    let desugared = output("{ var i = 0; while (i < 3) { print i; i = i + 1; } }");
    assert_eq!("0\n1\n2\n", for_loop);
    assert_eq!(desugared, for_loop);
}

#[test]
fn for_loop_clauses_are_optional() {
    assert_eq!(
        "0\n1\n",
        output(r#"
            var i = 0;
            for (; i < 2;) {
                print i;
                i = i + 1;
            }
        "#)
    );
    assert_eq!("done\n", output(r#"for (;;) { break; } print "done";"#));
}

#[test]
fn for_loop_variable_is_scoped_to_the_loop() {
    assert_eq!("outer\n", output(r#"var i = "outer"; for (var i = 0; i < 1; i = i + 1) {} print i;"#));
}

#[test]
fn break_leaves_the_innermost_loop_only() {
    assert_eq!(
        "2\n2\n2\n",
        output(r#"
            var i = 0;
            while (i < 3) {
                var j = 0;
                while (true) {
                    {
                        if (j == 2) { break; }
                    }
                    j = j + 1;
                }
                print j;
                i = i + 1;
            }
        "#)
    );
}

#[test]
fn break_in_a_for_loop() {
    assert_eq!(
        "0\n1\n2\n",
        output("for (var i = 0; i < 10; i = i + 1) { if (i == 3) break; print i; }")
    );
}

#[test]
fn return_unwinds_through_loops() {
    assert_eq!(
        "5\n",
        output(r#"
            fun find() {
                var i = 0;
                while (true) {
                    {
                        if (i == 5) return i;
                    }
                    i = i + 1;
                }
            }
            print find();
        "#)
    );
}
