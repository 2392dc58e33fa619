//! Build script for hoist-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates desk.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys each section accepts
const SECTIONS: &[(&str, &[&str])] = &[
    (
        "motion",
        &[
            "unit_scale",
            "hysteresis",
            "safety_min",
            "safety_max",
            "position_source",
            "travel_speed",
        ],
    ),
    ("stall", &["timeout_ms", "min_progress", "max_seek_ms"]),
    ("actuator", &["kind", "inverted", "native_positioning"]),
    ("link", &["baudrate"]),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate desk.toml at compile time
///
/// The firmware parses the same file with its own line parser; this
/// catches mistakes before flashing instead of at boot.
fn validate_config() {
    println!("cargo:rerun-if-changed=desk.toml");

    let config_path = Path::new("desk.toml");
    if !config_path.exists() {
        fail("desk.toml not found", &["The firmware embeds desk.toml from the crate root."]);
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read desk.toml", &[&e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let msg = e.to_string();
            let lines: Vec<&str> = msg.lines().collect();
            fail("Invalid TOML syntax in desk.toml", &lines)
        }
    };

    let errors = check_config(&config);
    if !errors.is_empty() {
        let lines: Vec<&str> = errors.iter().map(String::as_str).collect();
        fail("Invalid desk.toml", &lines);
    }

    println!("cargo:warning=desk.toml validated successfully");
}

fn check_config(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(root) = config.as_table() else {
        errors.push("top level must be a table".to_string());
        return errors;
    };

    for (name, section) in root {
        let Some(keys) = SECTIONS.iter().find(|(s, _)| s == name).map(|(_, k)| *k) else {
            errors.push(format!("unknown section [{}]", name));
            continue;
        };
        let Some(table) = section.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
    }

    let int = |section: &str, key: &str| {
        config
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(toml::Value::as_integer)
    };
    let string = |section: &str, key: &str| {
        config
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(toml::Value::as_str)
    };

    if let Some(scale) = int("motion", "unit_scale") {
        if scale < 1 {
            errors.push("[motion] unit_scale must be at least 1".to_string());
        }
    }
    if let Some(h) = int("motion", "hysteresis") {
        if h < 0 {
            errors.push("[motion] hysteresis must not be negative".to_string());
        }
    }
    if let (Some(min), Some(max)) = (int("motion", "safety_min"), int("motion", "safety_max")) {
        if min >= max {
            errors.push("[motion] safety_min must be below safety_max".to_string());
        }
    }
    match string("motion", "position_source") {
        None | Some("telemetry") => {}
        Some("dead_reckoning") => {
            if int("motion", "travel_speed").unwrap_or(0) <= 0 {
                errors.push("[motion] dead_reckoning needs a positive travel_speed".to_string());
            }
        }
        Some(other) => errors.push(format!(
            "[motion] position_source must be 'telemetry' or 'dead_reckoning', got '{}'",
            other
        )),
    }

    if let Some(kind) = string("actuator", "kind") {
        if !["relay", "serial"].contains(&kind) {
            errors.push(format!("[actuator] kind must be 'relay' or 'serial', got '{}'", kind));
        }
    }

    if let Some(baud) = int("link", "baudrate") {
        if baud <= 0 {
            errors.push("[link] baudrate must be positive".to_string());
        }
    }

    errors
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[&str]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
