fn main() {
    println!("cargo:rerun-if-changed=src/default_settings.toml");
    let content = include_str!("src/default_settings.toml");
    let value: toml::Value = match content.parse() {
        Ok(value) => value,
        Err(e) => panic!("src/default_settings.toml: {e}"),
    };
    for section in ["lookup", "matrix", "candidates"] {
        if !value.get(section).is_some_and(toml::Value::is_table) {
            panic!("src/default_settings.toml is missing the [{section}] table");
        }
    }
}
