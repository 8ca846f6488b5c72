//! Write the OpenAPI specification to disk in JSON and YAML

use deepresearch_web::openapi::{get_openapi_json, get_openapi_yaml};
use std::fs;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let docs_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("deepresearch-web/docs"));
    fs::create_dir_all(&docs_dir)?;

    let json_path = docs_dir.join("openapi.json");
    fs::write(&json_path, get_openapi_json()?)?;
    println!("✅ Generated: {}", json_path.display());

    let yaml_path = docs_dir.join("openapi.yaml");
    fs::write(&yaml_path, get_openapi_yaml()?)?;
    println!("✅ Generated: {}", yaml_path.display());

    Ok(())
}
