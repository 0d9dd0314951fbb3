//! Test family selection.
//!
//! Maps a decoded architecture to the set of ISA test-family prefixes
//! relevant to it. Pure function, no I/O. The returned order is the display
//! order (base families, supervisor families, then one block per extension);
//! downstream matching treats the result as a set.

use crate::arch::ArchSpec;

/// Extensions that contribute their own user-level test families, checked in
/// this fixed order.
const FAMILY_EXTENSIONS: [char; 5] = ['m', 'a', 'f', 'd', 'c'];

/// Select the ISA test families implied by `arch`.
///
/// Every family is of the form `rv<width>u<x>-p` (physical-memory tests) or
/// `rv<width>u<x>-v` (virtual-memory tests, supervisor only), plus the
/// machine-mode and supervisor-mode families `rv<width>mi-p` / `rv<width>si-p`.
pub fn select_families(arch: &ArchSpec) -> Vec<String> {
    let w = arch.base().bits();
    let mut families = Vec::new();
    let add = |families: &mut Vec<String>, family: String| {
        if !families.contains(&family) {
            families.push(family);
        }
    };

    add(&mut families, format!("rv{w}ui-p"));
    add(&mut families, format!("rv{w}mi-p"));

    let supervisor = arch.has_supervisor();
    if supervisor {
        add(&mut families, format!("rv{w}ui-v"));
        add(&mut families, format!("rv{w}si-p"));
    }

    for ext in FAMILY_EXTENSIONS {
        if arch.has_extension(ext) {
            add(&mut families, format!("rv{w}u{ext}-p"));
            if supervisor {
                add(&mut families, format!("rv{w}u{ext}-v"));
            }
        }
    }

    families
}

#[cfg(test)]
mod tests {
    use super::*;

    fn families_for(raw: &str) -> Vec<String> {
        select_families(&ArchSpec::parse(raw).unwrap())
    }

    #[test]
    fn base_families_always_present() {
        let families = families_for("RV64I");
        assert_eq!(families, vec!["rv64ui-p", "rv64mi-p"]);
    }

    #[test]
    fn rv32imu_selects_user_m_family() {
        let families = families_for("RV32IMU");
        for expected in ["rv32ui-p", "rv32mi-p", "rv32um-p"] {
            assert!(families.contains(&expected.to_string()), "missing {expected}");
        }
        // No supervisor, so no virtual-memory families.
        assert!(!families.iter().any(|f| f.ends_with("-v")));
    }

    #[test]
    fn supervisor_adds_virtual_and_si_families() {
        let families = families_for("RV64IMS");
        assert!(families.contains(&"rv64ui-v".to_string()));
        assert!(families.contains(&"rv64si-p".to_string()));
        assert!(families.contains(&"rv64um-v".to_string()));
    }

    #[test]
    fn extension_block_order_is_mafdc() {
        let families = families_for("RV64IMAFDC");
        let tail: Vec<_> = families
            .iter()
            .filter(|f| f.starts_with("rv64u") && !f.starts_with("rv64ui"))
            .cloned()
            .collect();
        assert_eq!(tail, vec!["rv64um-p", "rv64ua-p", "rv64uf-p", "rv64ud-p", "rv64uc-p"]);
    }

    #[test]
    fn adding_extensions_never_removes_families() {
        let narrow = families_for("RV64IM");
        let wide = families_for("RV64IMAFDCS");
        for family in &narrow {
            assert!(wide.contains(family), "{family} dropped by wider arch");
        }
    }

    #[test]
    fn no_family_appears_twice() {
        // 'G' expansion plus explicit letters produces repeated extension
        // letters; families must still be unique.
        let families = families_for("RV64GMAFD");
        let mut deduped = families.clone();
        deduped.dedup();
        assert_eq!(families.len(), deduped.len());
    }
}
