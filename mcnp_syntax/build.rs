// build.rs - TOML-driven constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    block_reader: BlockReaderLimits,
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    formatting: FormattingDefaults,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct BlockReaderLimits {
    max_file_size: u64,
    max_include_depth: usize,
    blank_space_continue: usize,
    tab_size: usize,
    max_blocks: usize,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_token_count: usize,
    max_token_length: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_parse_depth: usize,
    max_error_history: usize,
    max_shortcut_expansion: usize,
}

#[derive(serde::Deserialize)]
struct FormattingDefaults {
    default_float_precision: usize,
    continuation_indent: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_error_collection: usize,
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_file: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=MCNP_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=MCNP_CONFIG_DIR");

    let profile = env::var("MCNP_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("MCNP_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the crate directory
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
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_constraints(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_constraints(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_INCLUDE_DEPTH: usize = 64;

    if config.block_reader.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("SECURITY: max_file_size exceeds absolute maximum");
    }

    if config.block_reader.max_include_depth > ABSOLUTE_MAX_INCLUDE_DEPTH {
        panic!("SECURITY: max_include_depth exceeds absolute maximum");
    }

    // These describe the input format itself and cannot be tuned
    if config.block_reader.blank_space_continue != 5 {
        panic!("FORMAT: blank_space_continue must be 5");
    }
    if config.block_reader.max_blocks != 3 {
        panic!("FORMAT: max_blocks must be 3");
    }
    if config.block_reader.tab_size == 0 {
        panic!("FORMAT: tab_size must be positive");
    }

    if config.formatting.default_float_precision == 0
        || config.formatting.default_float_precision > 17
    {
        panic!("FORMAT: default_float_precision must be in 1..=17");
    }

    if config.syntax.max_parse_depth < 16 {
        panic!("SYNTAX: max_parse_depth too small to parse nested geometry");
    }

    if config.syntax.max_shortcut_expansion == 0
        || config.syntax.max_shortcut_expansion > config.lexical.max_token_count
    {
        panic!("SYNTAX: max_shortcut_expansion must be in 1..=max_token_count");
    }

    if config.logging.max_log_events_per_file > config.logging.log_buffer_size {
        panic!("LOGGING: max_log_events_per_file exceeds log_buffer_size");
    }

    if profile == "production" && config.block_reader.max_file_size > 50_000_000 {
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
    pub mod block_reader {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const MAX_INCLUDE_DEPTH: usize = {};
        pub const BLANK_SPACE_CONTINUE: usize = {};
        pub const TAB_SIZE: usize = {};
        pub const MAX_BLOCKS: usize = {};
    }}

    pub mod lexical {{
        pub const MAX_TOKEN_COUNT: usize = {};
        pub const MAX_TOKEN_LENGTH: usize = {};
    }}

    pub mod syntax {{
        pub const MAX_PARSE_DEPTH: usize = {};
        pub const MAX_ERROR_HISTORY: usize = {};
        pub const MAX_SHORTCUT_EXPANSION: usize = {};
    }}

    pub mod formatting {{
        pub const DEFAULT_FLOAT_PRECISION: usize = {};
        pub const CONTINUATION_INDENT: usize = {};
    }}

    pub mod logging {{
        pub const MAX_ERROR_COLLECTION: usize = {};
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_FILE: usize = {};
    }}
}}
"#,
        profile,
        // Block reader
        config.block_reader.max_file_size,
        config.block_reader.max_include_depth,
        config.block_reader.blank_space_continue,
        config.block_reader.tab_size,
        config.block_reader.max_blocks,
        // Lexical
        config.lexical.max_token_count,
        config.lexical.max_token_length,
        // Syntax
        config.syntax.max_parse_depth,
        config.syntax.max_error_history,
        config.syntax.max_shortcut_expansion,
        // Formatting
        config.formatting.default_float_precision,
        config.formatting.continuation_indent,
        // Logging
        config.logging.max_error_collection,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_file,
    );

    fs::write(output_path, constants_code).unwrap();
}
