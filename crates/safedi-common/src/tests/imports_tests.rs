use crate::imports::{ImportStatement, deduplicated};

fn partial(module: &str, type_name: &str) -> ImportStatement {
    ImportStatement {
        attribute: String::new(),
        kind: "struct".to_owned(),
        module_name: module.to_owned(),
        type_name: type_name.to_owned(),
    }
}

#[test]
fn test_as_source_renders_all_parts() {
    let import = ImportStatement {
        attribute: "testable".to_owned(),
        kind: "struct".to_owned(),
        module_name: "Foundation".to_owned(),
        type_name: "URL".to_owned(),
    };
    assert_eq!(import.as_source(), "@testable import struct Foundation.URL");
    assert_eq!(
        ImportStatement::wholesale("UIKit").as_source(),
        "import UIKit"
    );
}

#[test]
fn test_deduplicated_sorts_modules_and_removes_duplicates() {
    let imports = vec![
        ImportStatement::wholesale("UIKit"),
        ImportStatement::wholesale("Foundation"),
        ImportStatement::wholesale("UIKit"),
    ];
    let deduplicated = deduplicated(&imports);
    let rendered: Vec<String> = deduplicated
        .iter()
        .map(ImportStatement::as_source)
        .collect();
    assert_eq!(rendered, ["import Foundation", "import UIKit"]);
}

#[test]
fn test_wholesale_import_wins_over_partial_imports() {
    let imports = vec![
        partial("Foundation", "URL"),
        ImportStatement::wholesale("Foundation"),
        partial("Foundation", "Data"),
    ];
    let deduplicated = deduplicated(&imports);
    let rendered: Vec<String> = deduplicated
        .iter()
        .map(ImportStatement::as_source)
        .collect();
    assert_eq!(rendered, ["import Foundation"]);
}

#[test]
fn test_partial_imports_are_kept_when_no_wholesale_exists() {
    let imports = vec![
        partial("Foundation", "URL"),
        partial("Foundation", "Data"),
        partial("Foundation", "URL"),
    ];
    let deduplicated = deduplicated(&imports);
    let rendered: Vec<String> = deduplicated
        .iter()
        .map(ImportStatement::as_source)
        .collect();
    assert_eq!(
        rendered,
        ["import struct Foundation.Data", "import struct Foundation.URL"]
    );
}
