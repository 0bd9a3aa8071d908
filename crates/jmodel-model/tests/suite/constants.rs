use jmodel_model::{ConstValue, LookupEnvironment, Value};
use pretty_assertions::assert_eq;

use super::source_env;

const K: &str = r#"package c;

public class K {
    static final int BASE = 10;
    static final long BIG = BASE * 1000L;
    static final String S = "v" + BASE;
    static final boolean F = BASE > 5 && !false;
    static final int SHIFT = -1 >>> 28;
    static final char C = 'a' + 1;
    static final double D = 1 / 2.0;
    static final int TERN = BASE > 5 ? 1 : 2;
    static final int OVER = Integer.MAX_VALUE + 1;
    static final int BY_ZERO = 1 / 0;
    static final int LOOP_A = LOOP_B + 1;
    static final int LOOP_B = LOOP_A + 1;
    int notConst = 3;
    static final int NOT = notConst + 1;
    static final int FROM_OTHER = Other.LIMIT * 2;
}

class Other {
    static final int LIMIT = 21;
}
"#;

fn env() -> LookupEnvironment {
    source_env(&[("c/K.java", K)])
}

fn constant(env: &LookupEnvironment, field: &str) -> Option<Value> {
    env.find_type("c.K")
        .unwrap()
        .field(field)
        .unwrap()
        .constant_value()
}

#[test]
fn field_initializers_fold() {
    let env = env();
    assert_eq!(constant(&env, "BASE"), Some(Value::Int(10)));
    assert_eq!(constant(&env, "BIG"), Some(Value::Long(10_000)));
    assert_eq!(constant(&env, "S"), Some(Value::String("v10".into())));
    assert_eq!(constant(&env, "F"), Some(Value::Boolean(true)));
    assert_eq!(constant(&env, "SHIFT"), Some(Value::Int(15)));
    assert_eq!(constant(&env, "C"), Some(Value::Char('b')));
    assert_eq!(constant(&env, "D"), Some(Value::Double(0.5)));
    assert_eq!(constant(&env, "TERN"), Some(Value::Int(1)));
    assert_eq!(constant(&env, "OVER"), Some(Value::Int(i32::MIN)));
    assert_eq!(constant(&env, "FROM_OTHER"), Some(Value::Int(42)));
}

#[test]
fn non_constants_have_no_value() {
    let env = env();
    assert_eq!(constant(&env, "BY_ZERO"), None);
    assert_eq!(constant(&env, "notConst"), None);
    assert_eq!(constant(&env, "NOT"), None);
}

#[test]
fn cyclic_initializers_terminate() {
    let env = env();
    assert_eq!(constant(&env, "LOOP_A"), None);
    assert_eq!(constant(&env, "LOOP_B"), None);
}

#[test]
fn raw_constants_match_values() {
    let env = env();
    let k = env.find_type("c.K").unwrap();
    let big = k.field("BIG").unwrap();
    assert_eq!(big.constant(), Some(&ConstValue::Long(10_000)));
    assert_eq!(big.to_string(), "static final long BIG = 10000L");
}

#[test]
fn standalone_expressions() {
    let env = env();
    assert_eq!(env.evaluate("1 + 2", None), Value::Int(3));
    assert_eq!(env.evaluate("\"a\" + 1 + 'b'", None), Value::String("a1b".into()));
    assert_eq!(env.evaluate("Integer.MAX_VALUE", None), Value::Int(i32::MAX));
    assert_eq!(env.evaluate("Integer.BYTES", None), Value::Int(4));
    assert_eq!(env.evaluate("(byte) 200", None), Value::Byte(-56));
    assert_eq!(env.evaluate("1 +", None), Value::Unknown);
    assert_eq!(env.evaluate("BASE", None), Value::Unknown);
}

#[test]
fn expressions_resolve_inside_a_context_type() {
    let env = env();
    let k = env.find_type("c.K").unwrap();
    assert_eq!(env.evaluate("BASE * 2", Some(&k)), Value::Int(20));
    assert_eq!(env.evaluate("Other.LIMIT", Some(&k)), Value::Int(21));
    assert_eq!(env.evaluate("c.K.BASE + 1", None), Value::Int(11));
}

#[test]
fn binary_constants_are_available_to_source() {
    let env = LookupEnvironment::builder()
        .source_text(
            "/mem/c/Uses.java",
            "package c;\npublic class Uses {\n    public static final long MAX = Long.MAX_VALUE - Integer.MAX_VALUE;\n}\n",
        )
        .build()
        .unwrap();
    let uses = env.find_type("c.Uses").unwrap();
    assert_eq!(
        uses.field("MAX").unwrap().constant_value(),
        Some(Value::Long(i64::MAX - i64::from(i32::MAX)))
    );
}
