// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    lexical: LexicalLimits,
    preprocessor: PreprocessorLimits,
    syntax: SyntaxLimits,
    patch: PatchLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_string_size: usize,
    max_identifier_length: usize,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct PreprocessorLimits {
    max_macro_depth: usize,
    max_include_depth: usize,
    max_macro_count: usize,
    max_directive_length: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_error_count: usize,
    max_recovery_scan_tokens: usize,
}

#[derive(serde::Deserialize)]
struct PatchLimits {
    fixed_point_shift: u32,
    extended_thing_slots: i64,
    extended_state_slots: i64,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=DOOM_SCRIPT_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=DOOM_SCRIPT_CONFIG_DIR");

    let profile =
        env::var("DOOM_SCRIPT_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("DOOM_SCRIPT_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the doom_script directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_MACRO_DEPTH: usize = 4096;
    const ABSOLUTE_MAX_INCLUDE_DEPTH: usize = 1024;

    if config.file_processing.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("LIMITS: max_file_size exceeds absolute maximum");
    }

    if config.preprocessor.max_macro_depth == 0
        || config.preprocessor.max_macro_depth > ABSOLUTE_MAX_MACRO_DEPTH
    {
        panic!("LIMITS: max_macro_depth must be within 1..={ABSOLUTE_MAX_MACRO_DEPTH}");
    }

    if config.preprocessor.max_include_depth == 0
        || config.preprocessor.max_include_depth > ABSOLUTE_MAX_INCLUDE_DEPTH
    {
        panic!("LIMITS: max_include_depth must be within 1..={ABSOLUTE_MAX_INCLUDE_DEPTH}");
    }

    if config.syntax.max_error_count == 0 {
        panic!("LIMITS: max_error_count must be at least 1");
    }

    if config.patch.fixed_point_shift == 0 || config.patch.fixed_point_shift > 30 {
        panic!("LIMITS: fixed_point_shift must be within 1..=30");
    }

    if profile == "production" && config.file_processing.max_file_size > 50_000_000 {
        panic!("PRODUCTION: max_file_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
    }}

    pub mod lexical {{
        pub const MAX_STRING_SIZE: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
    }}

    pub mod preprocessor {{
        pub const MAX_MACRO_DEPTH: usize = {};
        pub const MAX_INCLUDE_DEPTH: usize = {};
        pub const MAX_MACRO_COUNT: usize = {};
        pub const MAX_DIRECTIVE_LENGTH: usize = {};
    }}

    pub mod syntax {{
        pub const MAX_ERROR_COUNT: usize = {};
        pub const MAX_RECOVERY_SCAN_TOKENS: usize = {};
    }}

    pub mod patch {{
        pub const FIXED_POINT_SHIFT: u32 = {};
        pub const EXTENDED_THING_SLOTS: i64 = {};
        pub const EXTENDED_STATE_SLOTS: i64 = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
    }}
}}
"#,
        profile,
        config.file_processing.max_file_size,
        config.lexical.max_string_size,
        config.lexical.max_identifier_length,
        config.lexical.max_token_count,
        config.preprocessor.max_macro_depth,
        config.preprocessor.max_include_depth,
        config.preprocessor.max_macro_count,
        config.preprocessor.max_directive_length,
        config.syntax.max_error_count,
        config.syntax.max_recovery_scan_tokens,
        config.patch.fixed_point_shift,
        config.patch.extended_thing_slots,
        config.patch.extended_state_slots,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
    );

    fs::write(output_path, constants_code).unwrap();
}
