// Print the schema and seed settings of the built-in modules
//
// Run with: cargo run --example print_ddl -- [pgsql|mysql|sqlite] [descriptor dir]
// Set RUST_LOG=debug to see what gets loaded.

use pbxdesc::{DdlOptions, Dialect, DocsConfig, SchemaRegistry, generate_docs, groups};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let dialect: Dialect = args.next().as_deref().unwrap_or("pgsql").parse()?;

    let mut builder = SchemaRegistry::builder()
        .with_builtin_modules()
        .with_env_prefix("PBX");
    if let Some(dir) = args.next() {
        builder = builder.descriptor_dir(dir);
    }
    let registry = builder.build()?;

    println!("-- {} module(s), dialect {dialect}\n", registry.len());
    println!(
        "{}\n",
        registry.ddl_for_with(dialect, &DdlOptions::new().if_not_exists())?
    );

    for dangling in registry.dangling_references() {
        println!(
            "-- warning: {}.{} references {}.{} ({:?})",
            dangling.table, dangling.column, dangling.target_table, dangling.target_field, dangling.kind
        );
    }

    println!("\n-- admin permissions");
    for permission in registry.permissions_for(groups::ADMIN) {
        println!("--   {}", permission.name);
    }

    println!("\n-- cdr settings (PBX_CDR_* overrides applied)");
    for (key, value) in registry.resolve_settings("cdr")? {
        println!("--   {key} = {value}");
    }

    if let Some(cdr) = registry.modules().first() {
        println!("\n{}", generate_docs(cdr, DocsConfig::new().hide_deprecated()));
    }

    Ok(())
}
