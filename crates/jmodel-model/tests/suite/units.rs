use std::path::Path;

use jmodel_model::{Printer, UnitKey};
use pretty_assertions::assert_eq;

use super::{source_env, type_names};

const MAIN: &str = r#"package u;

import java.util.List;
import java.util.*;
import static u.Helper.twice;
import static u.Helper.*;

class Helper {
    static int twice(int x) { return 2 * x; }
}

public class Main {
    List<String> names;

    static class Deep {
        interface Deeper {}
    }
}
"#;

fn env() -> jmodel_model::LookupEnvironment {
    source_env(&[("u/Main.java", MAIN)])
}

#[test]
fn imports_keep_their_written_form() {
    let env = env();
    let unit = env.compilation_unit(Path::new("/mem/u/Main.java")).unwrap();
    assert_eq!(unit.package_name(), "u");

    let imports = unit.imports();
    assert_eq!(imports.len(), 4);
    assert_eq!(imports[0].path, "java.util.List");
    assert_eq!(imports[0].simple_name(), Some("List"));
    assert!(imports[1].is_on_demand);
    assert_eq!(imports[1].simple_name(), None);
    assert_eq!(imports[1].to_string(), "import java.util.*;");
    assert!(imports[2].is_static);
    assert_eq!(imports[3].to_string(), "import static u.Helper.*;");

    assert_eq!(unit.import(0), Some(&imports[0]));
    assert!(unit.import(9).is_none());
    assert_eq!(unit.import_named("twice").unwrap().path, "u.Helper.twice");
    assert!(unit.import_named("Map").is_none());
}

#[test]
fn types_are_found_at_any_depth() {
    let env = env();
    let unit = env.compilation_unit(Path::new("/mem/u/Main.java")).unwrap();
    assert_eq!(type_names(unit.types()), vec!["Helper", "Main"]);
    assert_eq!(unit.main_type().unwrap().name(), "Main");

    let deeper = unit.find_type("Deeper").unwrap();
    assert_eq!(deeper.qualified_name(), "u.Main.Deep.Deeper");
    assert!(deeper.is_interface());
    assert_eq!(unit.find_type("Helper").unwrap().qualified_name(), "u.Helper");
    assert!(unit.find_type("Nope").is_none());
}

#[test]
fn unit_identity_follows_its_main_type() {
    let env = env();
    let main = env.find_type("u.Main").unwrap();
    let unit = main.compilation_unit().unwrap();
    assert_eq!(
        unit.key(),
        &UnitKey {
            package: "u".into(),
            main_type: "Main".into(),
        }
    );
    assert_eq!(unit.key().to_string(), "u/Main");
    assert_eq!(env.find_type("u.Helper").unwrap().compilation_unit().unwrap(), unit);
    assert_eq!(env.compilation_units(), vec![unit.clone()]);
    assert_eq!(unit.path(), Path::new("/mem/u/Main.java"));
    assert!(unit.parse_errors().is_empty());
    assert!(env.find_type("java.lang.String").unwrap().compilation_unit().is_none());
}

#[test]
fn printed_unit_lists_package_imports_and_types() {
    let env = env();
    let unit = env.compilation_unit(Path::new("/mem/u/Main.java")).unwrap();
    let text = Printer::new().members(false).print_unit(&unit);
    assert_eq!(
        text,
        "package u;\n\
         import java.util.List;\n\
         import java.util.*;\n\
         import static u.Helper.twice;\n\
         import static u.Helper.*;\n\
         \n\
         class u.Helper\n\
         \n\
         public class u.Main\n"
    );
}

#[test]
fn syntax_errors_are_kept_on_the_unit() {
    let env = source_env(&[(
        "u/Bad.java",
        "package u;\npublic class Bad {\n    int x = ;\n    public void ok() {}\n}\n",
    )]);
    let bad = env.find_type("u.Bad").unwrap();
    let unit = bad.compilation_unit().unwrap();
    assert!(!unit.parse_errors().is_empty());
    assert!(!env.compile_errors(&bad).is_empty());
    assert_eq!(bad.methods_named("ok").len(), 1);
}
