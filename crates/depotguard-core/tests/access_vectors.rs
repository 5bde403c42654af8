//! Bell-LaPadula vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use depotguard_core::access::{
    check_access, check_read_access, check_write_access, classify, AccessMode,
};
use depotguard_core::SecurityLevel;

mod vector_loader;
use vector_loader::{load, BlpCase, ClassificationCase};

#[test]
fn blp_matrix_vectors() {
    let v = load::<BlpCase>("blp_matrix.json");
    assert_eq!(v.cases.len(), 16, "{}", v.description);

    for c in v.cases {
        assert_eq!(
            check_read_access(c.subject, c.object),
            c.read,
            "read subject={} object={}",
            c.subject,
            c.object
        );
        assert_eq!(
            check_write_access(c.subject, c.object),
            c.write,
            "write subject={} object={}",
            c.subject,
            c.object
        );
        assert_eq!(check_access(c.subject, c.object, AccessMode::Read), c.read);
        assert_eq!(check_access(c.subject, c.object, AccessMode::Write), c.write);
    }
}

#[test]
fn read_and_write_follow_rank_for_every_pair() {
    for s in SecurityLevel::ALL {
        for o in SecurityLevel::ALL {
            assert_eq!(check_read_access(s, o), s.rank() >= o.rank());
            assert_eq!(check_write_access(s, o), s.rank() <= o.rank());
        }
    }
}

#[test]
fn equal_levels_allow_both_directions() {
    for l in SecurityLevel::ALL {
        assert!(check_read_access(l, l));
        assert!(check_write_access(l, l));
    }
}

#[test]
fn confidential_subject_against_secret_and_unclassified() {
    let alice = SecurityLevel::Confidential;
    assert!(!check_read_access(alice, SecurityLevel::Secret));
    assert!(check_read_access(alice, SecurityLevel::Unclassified));
    // no write down
    assert!(!check_write_access(alice, SecurityLevel::Unclassified));
    assert!(check_write_access(alice, SecurityLevel::Secret));
}

#[test]
fn classification_vectors() {
    let v = load::<ClassificationCase>("classification.json");
    for c in v.cases {
        assert_eq!(classify(&c.data_type), c.level, "data_type={:?}", c.data_type);
    }
}

#[test]
fn access_mode_parsing() {
    assert_eq!("read".parse::<AccessMode>().unwrap(), AccessMode::Read);
    assert_eq!(" WRITE ".parse::<AccessMode>().unwrap(), AccessMode::Write);
    let err = "delete".parse::<AccessMode>().expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INVALID_INPUT");
}
