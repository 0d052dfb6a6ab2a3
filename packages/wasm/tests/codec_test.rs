//! Integration tests for the record-level codec API
//!
//! The test guest echoes its input, so `build_<kind>` followed by
//! `parse_<kind>` exercises the full envelope in both directions.

mod common;

use common::{BOOT_FAILURE, MALFORMED, PARSE_ERROR, TRAP};
use phi_save_codec_types::{
    Chapter8Base, GameKey, GameProgress, GameRecord, Key, Level, LevelRecord, Money, MultiLevel,
    ProgressBase, RecordKind, RecordMap, RecordValue, Settings, SettingsBase, SongRecord, Summary,
    User,
};
use phi_save_codec_wasm::{CodecError, SaveCodec};
use std::collections::BTreeMap;

fn sample_user() -> User {
    User {
        version: 1,
        show_player_id: false,
        self_intro: "Phigros!".to_string(),
        avatar: "Introduction".to_string(),
        background: "Glaciaxion.SunsetRay.0".to_string(),
    }
}

// ============================================================================
// Untyped records
// ============================================================================

#[test]
fn test_settings_map_round_trip() {
    let mut codec = common::codec();
    let record: RecordMap = [
        ("volume", RecordValue::from(80)),
        ("fullscreen", RecordValue::from(true)),
    ]
    .into_iter()
    .collect();

    let bytes = codec.build(RecordKind::Settings, &record).unwrap();
    assert!(!bytes.is_empty());

    let parsed = codec.parse(RecordKind::Settings, &bytes).unwrap();
    assert_eq!(parsed, record);
    assert_eq!(parsed["volume"], RecordValue::from(80));
    assert_eq!(parsed["fullscreen"], RecordValue::from(true));
}

#[test]
fn test_non_finite_floats_round_trip() {
    let mut codec = common::codec();

    // {"bright": NaN as f32, "music_volume": +Inf as f32, "sound_offset": -Inf as f32}
    let mut wire = vec![0x83];
    for (key, value) in [
        ("bright", f32::NAN),
        ("music_volume", f32::INFINITY),
        ("sound_offset", f32::NEG_INFINITY),
    ] {
        wire.push(0xa0 | key.len() as u8);
        wire.extend_from_slice(key.as_bytes());
        wire.push(0xca);
        wire.extend_from_slice(&value.to_bits().to_be_bytes());
    }

    let parsed = codec.parse(RecordKind::Settings, &wire).unwrap();
    assert!(matches!(parsed["bright"], RecordValue::F32(v) if v.is_nan()));
    assert_eq!(parsed["music_volume"], RecordValue::F32(f32::INFINITY));
    assert_eq!(parsed["sound_offset"], RecordValue::F32(f32::NEG_INFINITY));

    let rebuilt = codec.build(RecordKind::Settings, &parsed).unwrap();
    assert_eq!(rebuilt, wire);
    assert!(codec
        .parse(RecordKind::Settings, &rebuilt)
        .unwrap()
        .same_content(&parsed));
}

#[test]
fn test_every_kind_is_reachable() {
    let mut codec = common::codec();
    let record: RecordMap = [("version", 1)].into_iter().collect();

    for kind in RecordKind::ALL {
        let bytes = codec.build(kind, &record).unwrap();
        assert_eq!(codec.parse(kind, &bytes).unwrap(), record, "{kind}");
    }
}

// ============================================================================
// Typed records
// ============================================================================

#[test]
fn test_user_round_trip() {
    let mut codec = common::codec();
    let user = sample_user();

    let bytes = codec.build_user(&user).unwrap();
    assert_eq!(codec.parse_user(&bytes).unwrap(), user);
}

#[test]
fn test_summary_round_trip() {
    let mut codec = common::codec();
    let level = Level {
        clear: 12,
        fc: 5,
        phi: 1,
    };
    let summary = Summary {
        save_version: 6,
        challenge_mode_rank: 348,
        rks: 15.25,
        game_version: 97,
        avatar: "Introduction".to_string(),
        level: MultiLevel {
            ez: level,
            hd: level,
            r#in: Level::default(),
            at: Level::default(),
        },
    };

    let bytes = codec.build_summary(&summary).unwrap();
    assert_eq!(codec.parse_summary(&bytes).unwrap(), summary);
}

#[test]
fn test_settings_round_trip() {
    let mut codec = common::codec();
    let settings = Settings {
        version: 1,
        base: SettingsBase {
            chord_support: true,
            fc_ap_indicator: true,
            enable_hit_sound: true,
            low_resolution_mode: false,
        },
        device_name: "Pixel 8".to_string(),
        bright: 1.0,
        music_volume: 0.8,
        effect_volume: 0.5,
        hit_sound_volume: 0.75,
        sound_offset: -0.025,
        note_scale: 1.15,
    };

    let bytes = codec.build_settings(&settings).unwrap();
    assert_eq!(codec.parse_settings(&bytes).unwrap(), settings);
}

#[test]
fn test_game_record_round_trip() {
    let mut codec = common::codec();
    let mut song = SongRecord::new();
    song.insert(
        "IN".to_string(),
        LevelRecord {
            score: 1_000_000,
            acc: 100.0,
            fc: true,
        },
    );
    song.insert(
        "AT".to_string(),
        LevelRecord {
            score: 954_321,
            acc: 98.5,
            fc: false,
        },
    );
    let mut songs = BTreeMap::new();
    songs.insert("Rrhar'il.TeamGrimoire.0".to_string(), song);
    let record = GameRecord { version: 1, songs };

    let bytes = codec.build_game_record(&record).unwrap();
    let parsed = codec.parse_game_record(&bytes).unwrap();
    assert_eq!(parsed, record);
    assert_eq!(
        parsed.level("Rrhar'il.TeamGrimoire.0", "AT").unwrap().score,
        954_321
    );
}

#[test]
fn test_game_progress_round_trip() {
    let mut codec = common::codec();
    let progress = GameProgress {
        version: 4,
        base: ProgressBase {
            is_first_run: false,
            legacy_chapter_finished: true,
            already_show_collection_tip: true,
            already_show_auto_unlock_in_tip: false,
        },
        completed: "3.0".to_string(),
        song_update_info: 2,
        challenge_mode_rank: 348,
        money: Money {
            kib: 512,
            mib: 3,
            gib: 0,
            tib: 0,
            pib: 0,
        },
        unlock_flag_of_spasmodic: [true, true, false, false],
        unlock_flag_of_igallta: [true; 4],
        unlock_flag_of_rrharil: [false; 4],
        flag_of_song_record_key: [true, false, true, false, true, false, true, false],
        random_version_unlocked: [false; 6],
        chapter8_base: Chapter8Base {
            unlock_begin: true,
            unlock_second_phase: false,
            passed: false,
        },
        chapter8_song_unlocked: [true, false, false, false, false, false],
        flag_of_song_record_key_takumi: Some([true, false, false]),
    };

    let bytes = codec.build_game_progress(&progress).unwrap();
    assert_eq!(codec.parse_game_progress(&bytes).unwrap(), progress);
}

#[test]
fn test_game_key_round_trip() {
    let mut codec = common::codec();
    let mut keys = BTreeMap::new();
    keys.insert(
        "Glaciaxion".to_string(),
        Key {
            unlock_single: Some(true),
            unlock_illustration: Some(true),
            ..Default::default()
        },
    );
    keys.insert(
        "Chapter8".to_string(),
        Key {
            read_collection_piece_num: Some(2),
            unlock_collection_piece_num: Some(3),
            ..Default::default()
        },
    );
    let game_key = GameKey {
        version: 2,
        keys,
        lanota_read_keys: [true, true, false, false, false, false],
        camellia_read_key: Some(false),
        side_story4_begin_read_key: None,
        old_score_cleared_v390: None,
    };

    let bytes = codec.build_game_key(&game_key).unwrap();
    assert_eq!(codec.parse_game_key(&bytes).unwrap(), game_key);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_malformed_input_reports_guest_message() {
    let mut codec = common::codec();

    let err = codec.parse_user(&[MALFORMED, 0x00, 0x01]).unwrap_err();
    match &err {
        CodecError::Invocation { function, message } => {
            assert_eq!(function, "parse_user");
            assert_eq!(message, PARSE_ERROR);
        }
        other => panic!("expected invocation error, got {other:?}"),
    }
    assert_eq!(err.guest_message(), Some(PARSE_ERROR));

    // The slot was drained while building the error
    assert_eq!(codec.instance_mut().get_last_error().unwrap(), None);
}

#[test]
fn test_non_record_output_is_decode_error() {
    let mut codec = common::codec();
    let err = codec.parse(RecordKind::Summary, &[0x01]).unwrap_err();
    assert!(matches!(
        err,
        CodecError::Decode {
            kind: RecordKind::Summary,
            ..
        }
    ));
}

#[test]
fn test_success_leaves_no_pending_error() {
    let mut codec = common::codec();
    let bytes = codec.build_user(&sample_user()).unwrap();
    codec.parse_user(&bytes).unwrap();

    let instance = codec.instance_mut();
    assert_eq!(instance.get_last_error().unwrap(), None);
    assert!(matches!(
        instance.clear_last_error().unwrap_err(),
        CodecError::NoErrorToClear
    ));
}

#[test]
fn test_failed_calls_do_not_leak() {
    let mut codec = common::codec();
    let mut input = vec![0u8; 40_000];

    // Let memory grow to fit one full exchange first
    input[0] = 0x80;
    codec.instance_mut().invoke("parse_user", &input).unwrap();
    let baseline = codec.memory_size();

    input[0] = MALFORMED;
    for _ in 0..100 {
        let err = codec.parse_user(&input).unwrap_err();
        assert!(matches!(err, CodecError::Invocation { .. }));
    }

    assert_eq!(codec.memory_size(), baseline);
}

#[test]
fn test_trap_releases_input() {
    let mut codec = common::codec();
    let input = [TRAP, 0x01, 0x02, 0x03];

    let instance = codec.instance_mut();
    let spare = instance.allocate(input.len() as u32).unwrap();
    let ptr = spare.ptr();
    instance.free(spare).unwrap();

    let err = codec.parse_settings(&input).unwrap_err();
    match err {
        CodecError::Trap { function, .. } => assert_eq!(function, "parse_settings"),
        other => panic!("expected trap, got {other:?}"),
    }

    let instance = codec.instance_mut();
    let spare = instance.allocate(input.len() as u32).unwrap();
    assert_eq!(spare.ptr(), ptr, "input buffer must be freed after a trap");
    instance.free(spare).unwrap();
}

#[test]
fn test_unknown_function() {
    let mut codec = common::codec();
    let err = codec
        .instance_mut()
        .invoke("parse_replay", &[0x80])
        .unwrap_err();
    match err {
        CodecError::MissingExport { export_name } => assert_eq!(export_name, "parse_replay"),
        other => panic!("expected missing export, got {other:?}"),
    }
}

#[test]
fn test_empty_input_is_rejected() {
    let mut codec = common::codec();
    let err = codec.parse(RecordKind::GameKey, &[]).unwrap_err();
    assert!(matches!(err, CodecError::InvalidArgument(_)));
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_open_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codec.wasm");
    std::fs::write(&path, common::guest_bytes()).unwrap();

    let mut codec = SaveCodec::open(path).unwrap();
    let bytes = codec.build_user(&sample_user()).unwrap();
    assert_eq!(codec.parse_user(&bytes).unwrap(), sample_user());
}

#[test]
fn test_open_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = SaveCodec::open(dir.path().join("absent.wasm")).unwrap_err();
    assert!(err.is_instantiation());
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_instances_share_engine_not_state() {
    let engine = common::engine();
    let bytes = wat::parse_str(common::guest_wat_with("", true)).unwrap();
    let module = engine.load_module(&bytes).unwrap();

    let mut first = SaveCodec::from_instance(engine.instantiate(&module).unwrap());
    let mut second = SaveCodec::from_instance(engine.instantiate(&module).unwrap());

    assert_eq!(
        first.instance_mut().take_last_error().unwrap().as_deref(),
        Some(BOOT_FAILURE)
    );
    assert_eq!(first.instance_mut().get_last_error().unwrap(), None);
    assert_eq!(
        second.instance_mut().get_last_error().unwrap().as_deref(),
        Some(BOOT_FAILURE)
    );

    let bytes = first.build_user(&sample_user()).unwrap();
    assert_eq!(second.parse_user(&bytes).unwrap(), sample_user());
}
