use jmodel_model::{BaseType, TypeKind};
use pretty_assertions::assert_eq;

use super::source_env;

const GRID: &str = r#"package arr;

public class Grid {
    public int[][] cells;
    public String names[];
    public String[] rows[], single;
    public Grid[] neighbours;

    public int[] sizes(String... parts) { return null; }

    public long legacy()[] { return null; }
}
"#;

fn grid() -> jmodel_model::Type {
    source_env(&[("arr/Grid.java", GRID)])
        .find_type("arr.Grid")
        .unwrap()
}

#[test]
fn array_types_describe_their_leaf() {
    let grid = grid();
    let cells = grid.field("cells").unwrap().field_type().unwrap();
    assert_eq!(cells.array_dimension(), 2);
    assert!(cells.is_array());
    assert!(cells.is_primitive());
    assert_eq!(cells.primitive_type(), Some(BaseType::Int));
    assert_eq!(cells.name(), "int");
    assert_eq!(cells.kind(), TypeKind::Primitive);
    assert_eq!(cells.to_string(), "int[][]");

    let leaf = cells.leaf_component_type();
    assert_eq!(leaf.array_dimension(), 0);
    assert_ne!(leaf, cells);
    assert_eq!(leaf.array_type(2), cells);
}

#[test]
fn c_style_dimensions_fold_into_the_type() {
    let grid = grid();
    let names = grid.field("names").unwrap().field_type().unwrap();
    assert_eq!(names.array_dimension(), 1);
    assert_eq!(names.name(), "String");
    assert_eq!(names.qualified_name(), "java.lang.String");
    assert_eq!(names.kind(), TypeKind::Class);

    let rows = grid.field("rows").unwrap().field_type().unwrap();
    assert_eq!(rows.array_dimension(), 2);
    let single = grid.field("single").unwrap().field_type().unwrap();
    assert_eq!(single.array_dimension(), 1);

    let legacy = grid.methods_named("legacy").remove(0);
    let ret = legacy.return_type().unwrap().unwrap();
    assert_eq!(ret.to_string(), "long[]");
}

#[test]
fn array_of_a_declared_type_keeps_its_members() {
    let grid = grid();
    let neighbours = grid.field("neighbours").unwrap().field_type().unwrap();
    assert_eq!(neighbours.array_dimension(), 1);
    assert_eq!(neighbours.leaf_component_type(), grid);
    assert_eq!(neighbours.key().to_string(), "arr.Grid[]");
}

#[test]
fn varargs_parameters_are_arrays() {
    let grid = grid();
    let sizes = grid.methods_named("sizes").remove(0);
    assert!(sizes.is_varargs());

    let parts = &sizes.parameters()[0];
    assert!(parts.is_varargs());
    let ty = parts.parameter_type().unwrap();
    assert_eq!(ty.array_dimension(), 1);
    assert_eq!(ty.name(), "String");
    assert_eq!(parts.to_string(), "java.lang.String... parts");
    assert_eq!(sizes.signature(), "(java.lang.String[])");
    assert_eq!(sizes.to_string(), "public int[] sizes(java.lang.String... parts)");
}
