//! Static tables describing the fixed-column input format.
//!
//! Unlike the generated `compile_time` limits these are properties of the
//! format itself and are never tuned per build profile.

pub mod format {
    /// Relative tolerance used to decide whether a numeric value changed
    pub const REL_TOL: f64 = 1e-9;

    /// Absolute tolerance used to decide whether a numeric value changed
    pub const ABS_TOL: f64 = 0.0;

    /// Format version assumed when none is requested
    pub const DEFAULT_VERSION: (u32, u32, u32) = (6, 3, 0);

    /// Maximum line width per format version
    pub const LINE_LENGTHS: &[((u32, u32, u32), usize)] = &[
        ((5, 1, 60), 80),
        ((6, 1, 0), 80),
        ((6, 2, 0), 128),
        ((6, 3, 0), 128),
        ((6, 3, 1), 128),
    ];

    /// Marker that precedes an inline comment
    pub const INLINE_COMMENT: char = '$';

    /// Trailing marker that forces the next line to continue the record
    pub const CONTINUATION_MARKER: &str = " &";

    /// Prefix introducing the optional message block
    pub const MESSAGE_PREFIX: &str = "MESSAGE:";
}

pub mod vocabulary {
    /// Words that lex as keywords rather than free text
    pub const KEYWORDS: &[&str] = &[
        "read", "noecho", "file", "decode", "encode", "like", "but", "imp", "vol", "pwt", "ext",
        "fcl", "wwn", "dxc", "nonu", "pd", "tmp", "u", "trcl", "lat", "fill", "elpt", "cosy",
        "bflcl", "unc", "gas", "estep", "hstep", "nlib", "plib", "pnlib", "elib", "hlib", "alib",
        "slib", "tlib", "dlib", "cond", "refi", "refc", "refs", "no", "cel", "sur", "erg", "tme",
        "dir", "vec", "nrm", "pos", "rad", "axs", "x", "y", "z", "ccc", "ara", "wgt", "tr", "eff",
        "par", "dat", "loc", "bem", "bap",
    ];

    /// Surface mnemonics recognised in the surface block
    pub const SURFACE_TYPES: &[&str] = &[
        "p", "px", "py", "pz", "so", "s", "sx", "sy", "sz", "c/x", "c/y", "c/z", "cx", "cy", "cz",
        "k/x", "k/y", "k/z", "kx", "ky", "kz", "sq", "gq", "tx", "ty", "tz", "x", "y", "z", "box",
        "rpp", "sph", "rcc", "rhp", "hex", "rec", "trc", "ell", "wed", "arb",
    ];

    /// Particle designators and their names
    pub const PARTICLES: &[(char, &str)] = &[
        ('N', "neutron"),
        ('P', "photon"),
        ('E', "electron"),
        ('|', "negative muon"),
        ('Q', "anti neutron"),
        ('U', "electron neutrino"),
        ('V', "muon neutrino"),
        ('F', "positron"),
        ('H', "proton"),
        ('L', "lambda baryon"),
        ('+', "positive sigma baryon"),
        ('-', "negative sigma baryon"),
        ('X', "cascade"),
        ('Y', "negative cascade"),
        ('O', "omega baryon"),
        ('!', "positive muon"),
        ('<', "anti electron neutrino"),
        ('>', "anti muon neutrino"),
        ('G', "anti proton"),
        ('/', "positive pion"),
        ('Z', "neutral pion"),
        ('K', "positive kaon"),
        ('%', "kaon short"),
        ('^', "kaon long"),
        ('B', "anti lambda baryon"),
        ('_', "anti positive sigma baryon"),
        ('~', "anti negative sigma baryon"),
        ('C', "anti cascade"),
        ('W', "positive cascade"),
        ('@', "anti omega"),
        ('D', "deuteron"),
        ('T', "triton"),
        ('S', "helion"),
        ('A', "alpha particle"),
        ('*', "negative pion"),
        ('?', "negative kaon"),
        ('#', "heavy ion"),
    ];

    /// Data record prefixes with a dedicated grammar; others may fall back to raw text
    pub const MODELED_DATA_PREFIXES: &[&str] = &[
        "m", "mt", "mx", "imp", "vol", "tr", "u", "fill", "lat", "mode", "tmp",
    ];

    pub fn is_modeled_data_prefix(prefix: &str) -> bool {
        MODELED_DATA_PREFIXES
            .iter()
            .any(|p| p.eq_ignore_ascii_case(prefix))
    }

    pub fn is_keyword(word: &str) -> bool {
        KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
    }

    pub fn is_surface_type(word: &str) -> bool {
        SURFACE_TYPES.iter().any(|k| k.eq_ignore_ascii_case(word))
    }

    pub fn is_particle(symbol: char) -> bool {
        let upper = symbol.to_ascii_uppercase();
        PARTICLES.iter().any(|(c, _)| *c == upper)
    }

    pub fn particle_name(symbol: char) -> Option<&'static str> {
        let upper = symbol.to_ascii_uppercase();
        PARTICLES
            .iter()
            .find(|(c, _)| *c == upper)
            .map(|(_, name)| *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_lookups_ignore_case() {
        assert!(vocabulary::is_keyword("IMP"));
        assert!(vocabulary::is_keyword("read"));
        assert!(!vocabulary::is_keyword("kcode"));
        assert!(vocabulary::is_surface_type("C/Z"));
        assert!(vocabulary::is_particle('n'));
        assert_eq!(vocabulary::particle_name('h'), Some("proton"));
        assert_eq!(vocabulary::particle_name('$'), None);
        assert!(vocabulary::is_modeled_data_prefix("M"));
        assert!(!vocabulary::is_modeled_data_prefix("kcode"));
    }

    #[test]
    fn test_line_length_table_sorted() {
        let versions: Vec<_> = format::LINE_LENGTHS.iter().map(|(v, _)| *v).collect();
        let mut sorted = versions.clone();
        sorted.sort();
        assert_eq!(versions, sorted);
    }
}
