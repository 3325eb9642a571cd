//! Evidence-based project tooling detection
//!
//! A detection-based hook only runs when two pieces of evidence agree: the
//! tool's config file exists AND the dependency/binary is actually
//! installed. Config without the binary (or vice versa) means Skip, never a
//! spawn-and-fail.

use std::path::Path;

use serde::Deserialize;

#[derive(Deserialize, Default)]
struct PackageJson {
    #[serde(default)]
    scripts: std::collections::HashMap<String, String>,
}

fn package_json(root: &Path) -> PackageJson {
    std::fs::read_to_string(root.join("package.json"))
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

/// The `scripts.<name>` entry of package.json, when present.
pub fn package_script(root: &Path, name: &str) -> Option<String> {
    let pkg = package_json(root);
    pkg.scripts.get(name).map(|_| format!("npm run {name}"))
}

fn node_bin(root: &Path, name: &str) -> bool {
    root.join("node_modules/.bin").join(name).exists()
}

fn node_dep(root: &Path, name: &str) -> bool {
    root.join("node_modules").join(name).is_dir()
}

/// TypeScript: `tsconfig.json` plus an accessible `tsc`.
pub fn is_typescript_project(root: &Path) -> bool {
    root.join("tsconfig.json").is_file() && (node_dep(root, "typescript") || node_bin(root, "tsc"))
}

/// Biome: config file plus the installed package.
pub fn has_biome(root: &Path) -> bool {
    let config = root.join("biome.json").is_file() || root.join("biome.jsonc").is_file();
    config && (node_dep(root, "@biomejs/biome") || node_bin(root, "biome"))
}

const ESLINT_CONFIGS: &[&str] = &[
    ".eslintrc",
    ".eslintrc.json",
    ".eslintrc.js",
    ".eslintrc.cjs",
    ".eslintrc.yaml",
    ".eslintrc.yml",
    "eslint.config.js",
    "eslint.config.mjs",
    "eslint.config.cjs",
    "eslint.config.ts",
];

/// ESLint: any config file plus the installed package.
pub fn has_eslint(root: &Path) -> bool {
    let config = ESLINT_CONFIGS.iter().any(|c| root.join(c).is_file());
    config && (node_dep(root, "eslint") || node_bin(root, "eslint"))
}

/// Whether a file path carries one of the given extensions.
pub fn has_extension(path: &str, extensions: &[&str]) -> bool {
    extensions
        .iter()
        .any(|ext| path.ends_with(ext) && path.len() > ext.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sandbox(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ck-detect-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_typescript_needs_both_config_and_binary() {
        let root = sandbox("ts");
        assert!(!is_typescript_project(&root));

        fs::write(root.join("tsconfig.json"), "{}").unwrap();
        assert!(!is_typescript_project(&root)); // config alone is not evidence

        fs::create_dir_all(root.join("node_modules/typescript")).unwrap();
        assert!(is_typescript_project(&root));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_biome_detection() {
        let root = sandbox("biome");
        fs::write(root.join("biome.jsonc"), "{}").unwrap();
        assert!(!has_biome(&root));
        fs::create_dir_all(root.join("node_modules/@biomejs/biome")).unwrap();
        assert!(has_biome(&root));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_eslint_flat_config() {
        let root = sandbox("eslint");
        fs::write(root.join("eslint.config.mjs"), "export default []").unwrap();
        fs::create_dir_all(root.join("node_modules/eslint")).unwrap();
        assert!(has_eslint(&root));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_package_script() {
        let root = sandbox("pkg");
        fs::write(
            root.join("package.json"),
            r#"{"scripts": {"typecheck": "tsc --noEmit"}}"#,
        )
        .unwrap();
        assert_eq!(
            package_script(&root, "typecheck").as_deref(),
            Some("npm run typecheck")
        );
        assert!(package_script(&root, "lint").is_none());
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("src/a.ts", &[".ts", ".tsx"]));
        assert!(has_extension("src/a.tsx", &[".ts", ".tsx"]));
        assert!(!has_extension("src/a.rs", &[".ts", ".tsx"]));
        assert!(!has_extension(".ts", &[".ts"])); // bare extension is not a file
    }
}
