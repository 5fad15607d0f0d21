use super::*;
use pretty_assertions::assert_eq;

fn lower_str(pattern: &str, explicit_capture: bool) -> Result<Lowered, PatternError> {
    let options = if explicit_capture {
        PatternOptions::EXPLICIT_CAPTURE
    } else {
        PatternOptions::empty()
    };
    compile(pattern, options)
}

#[test]
fn test_group_counting() {
    let lowered = lower_str(r"(\d+)-(?<name>\w+)(?:x)", false).unwrap();
    assert_eq!(lowered.explicit_groups, 2);
}

#[test]
fn test_explicit_capture_skips_unnamed_groups() {
    let lowered = lower_str(r"(\d+)-(?<name>\w+)", true).unwrap();
    assert_eq!(lowered.explicit_groups, 1);
}

#[test]
fn test_program_ends_in_match() {
    let lowered = lower_str("ab|c", false).unwrap();
    assert_eq!(lowered.program.insts.last(), Some(&Inst::Match));
}

#[test]
fn test_nullable_star_gets_progress_check() {
    let lowered = lower_str("(a?)*", false).unwrap();
    assert_eq!(lowered.program.mark_slots, 1);
    assert!(lowered
        .program
        .insts
        .iter()
        .any(|inst| matches!(inst, Inst::CheckProgress(0))));

    let plain = lower_str("a*", false).unwrap();
    assert_eq!(plain.program.mark_slots, 0);
}

#[test]
fn test_huge_counted_repetition_is_too_large() {
    let err = lower_str("(?:ab){100000}", false).err().unwrap();
    assert!(matches!(err, PatternError::TooLarge { .. }));
}

#[test]
fn test_half_word_boundary_is_unsupported() {
    let err = lower_str(r"\b{start}a", false).err().unwrap();
    assert!(matches!(err, PatternError::Unsupported { .. }));
}

#[test]
fn test_class_subtraction_lowers_to_difference() {
    let lowered = lower_str("[a-z-[aeiou]]", false).unwrap();
    let Some(Inst::Class(ranges)) = lowered.program.insts.first() else {
        panic!("expected a class, got {:?}", lowered.program.insts);
    };
    assert!(class_has(ranges, 'b'));
    assert!(!class_has(ranges, 'a'));
    assert!(!class_has(ranges, 'u'));
    // Not a union with the subtracted class or with `-`.
    assert!(!class_has(ranges, '-'));
    assert!(!class_has(ranges, '['));
}

fn class_has(ranges: &[(char, char)], c: char) -> bool {
    crate::program::class_contains(ranges, c)
}

#[test]
fn test_lookaround_and_atomic_groups_are_not_captures() {
    let lowered = lower_str(r"(?=(a))(?!b)(?<=c)(?<!d)(?>e)(f)", false).unwrap();
    assert_eq!(lowered.explicit_groups, 2);
    let nested = lowered
        .program
        .insts
        .iter()
        .filter(|inst| matches!(inst, Inst::Look { .. } | Inst::Atomic { .. }))
        .count();
    assert_eq!(nested, 5);
}

#[test]
fn test_look_behind_carries_length_bound() {
    let lowered = lower_str("(?<=ab)c", false).unwrap();
    assert_eq!(
        lowered.program.insts.first(),
        Some(&Inst::Look {
            behind: true,
            negate: false,
            max_len: Some(2),
            next: 4,
        })
    );
}

#[test]
fn test_backreferences_track_captures() {
    let lowered = lower_str(r"(a)(?<x>b)\1\k<x>", false).unwrap();
    assert_eq!(lowered.explicit_groups, 2);
    assert_eq!(lowered.program.capture_slots, 9);
    let refs: Vec<_> = lowered
        .program
        .insts
        .iter()
        .filter_map(|inst| match inst {
            Inst::Backref(group) => Some(*group),
            _ => None,
        })
        .collect();
    assert_eq!(refs, [1, 2]);

    // Without backreferences no group bookkeeping is emitted.
    let plain = lower_str("(a)(b)", false).unwrap();
    assert_eq!(plain.program.capture_slots, 0);
    assert!(!plain
        .program
        .insts
        .iter()
        .any(|inst| matches!(inst, Inst::OpenGroup(_))));
}

#[test]
fn test_named_groups_are_numbered_after_unnamed_ones() {
    // `x` is group 2 even though it opens first.
    let lowered = lower_str(r"(?<x>a)(b)\2", false).unwrap();
    assert!(lowered
        .program
        .insts
        .iter()
        .any(|inst| *inst == Inst::Backref(2)));
}

#[test]
fn test_undefined_backreference() {
    let err = lower_str(r"(a)\2", false).err().unwrap();
    assert!(matches!(err, PatternError::UndefinedGroup { ref group } if group == "2"));

    let err = lower_str(r"(a)\k<missing>", false).err().unwrap();
    assert!(matches!(err, PatternError::UndefinedGroup { ref group } if group == "missing"));

    // Unnamed groups do not capture under ExplicitCapture.
    let err = lower_str(r"(a)\1", true).err().unwrap();
    assert!(matches!(err, PatternError::UndefinedGroup { .. }));
}
