use mailconf_fs::{Drift, Fingerprint, has_drifted};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn identical_bytes_never_drift(content in proptest::collection::vec(any::<u8>(), 0..512)) {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("deployed.conf");
        std::fs::write(&target, &content).unwrap();

        prop_assert_eq!(has_drifted(&target, &content).unwrap(), Drift::Same);
    }

    #[test]
    fn any_byte_change_is_detected(
        content in proptest::collection::vec(any::<u8>(), 1..512),
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("deployed.conf");
        std::fs::write(&target, &content).unwrap();

        let mut candidate = content.clone();
        let i = index.index(candidate.len());
        candidate[i] ^= flip;

        prop_assert_eq!(has_drifted(&target, &candidate).unwrap(), Drift::Different);
    }

    #[test]
    fn fingerprint_equality_follows_content(a in "\\PC*", b in "\\PC*") {
        let same = Fingerprint::of_bytes(a.as_bytes()) == Fingerprint::of_bytes(b.as_bytes());
        prop_assert_eq!(same, a == b);
    }
}
