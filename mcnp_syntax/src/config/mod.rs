//! Configuration for mcnp_syntax
//!
//! Compile-time limits are generated by build.rs from `config/<profile>.toml`.
//! Static tables describing the input format live in [`constants`] and
//! environment-driven preferences in [`runtime`].

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod constants;
pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("MCNP_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("MCNP_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_constants_match_format() {
        assert_eq!(compile_time::block_reader::BLANK_SPACE_CONTINUE, 5);
        assert_eq!(compile_time::block_reader::MAX_BLOCKS, 3);
        assert_eq!(compile_time::formatting::CONTINUATION_INDENT, 5);
        assert!(compile_time::syntax::MAX_PARSE_DEPTH >= 16);
    }

    #[test]
    fn test_source_info() {
        assert!(build_info::source_info().ends_with(".toml"));
    }
}
