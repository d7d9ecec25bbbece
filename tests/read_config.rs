//! Reading in-memory config streams into records.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;

use accfg::{read_from, Convert, Error, Shape};

#[derive(Debug, Default, Clone, PartialEq)]
struct Thing {
    name: String,
    size: i32,
}
accfg::record!(Thing { name, size });

#[derive(Debug, Default, PartialEq)]
struct Stuff {
    field: String,
    field2: String,
    value: i32,
    duration: i64,
    doit: bool,
    flag: HashMap<String, bool>,
    set: HashSet<String>,
    tag: Vec<String>,
    thing: Vec<Box<Thing>>,
    start: DateTime<Utc>,
    elapsed: Duration,
    header: HashMap<String, String>,
    header2: HashMap<String, Value>,
    param: Thing,
}
accfg::record!(Stuff {
    field,
    field2 => key("girth"),
    value,
    duration => convert(Convert::Duration),
    doit,
    flag,
    set,
    tag,
    thing,
    start,
    elapsed,
    header,
    header2,
    param,
});

const STUFF: &str = r#"field value
value    123
duration 1h
doit     yes
start    2024-01-01T02:03:04Z
elapsed  1m
girth    "very very \n"

# important comment
# bool map - individually
flag slithytove
flag borogrove
flag setbutfalse off

# bool map - as block
flag {
    humpty
    dumpty   off
}

# empty map - individually
set  borogrove
set  humpty dumpty

# empty map - as block
set {
    lorem
    ipsum
}

tag  bandersnatch
tag  jubjubtree
tag  lorem ipsum dolor

thing {
    name    momerath
    size    123
}

thing {
    name    vorpalsword
}

# string map - as block
header {
    type	json
    charset     ascii
}

header {
    length	1234
}

header2 {
    type	json
    flowrate    high
}

# string map - individually
header  refer altavista
header2 refer altavista

# struct
param {
    name    jubjubtree
    size    234
}


"#;

fn read_stuff(text: &str) -> Result<Stuff, Error> {
    let mut stuff = Stuff::default();
    read_from(text.as_bytes(), &mut stuff)?;
    Ok(stuff)
}

#[test]
fn test_read_config() {
    let data = read_stuff(STUFF).expect("read config");

    assert_eq!(data.field, "value");
    assert_eq!(data.field2, "very very \n");
    assert_eq!(data.value, 123);
    assert_eq!(data.duration, 3600);
    assert!(data.doit);

    assert_eq!(data.flag.get("slithytove"), Some(&true));
    assert_eq!(data.flag.get("borogrove"), Some(&true));
    assert_eq!(data.flag.get("setbutfalse"), Some(&false));
    assert_eq!(data.flag.get("humpty"), Some(&true));
    assert_eq!(data.flag.get("dumpty"), Some(&false));
    assert!(!data.flag.contains_key("missingval"));

    assert!(data.set.contains("borogrove"));
    assert_eq!(data.set.len(), 5);

    assert_eq!(
        data.tag,
        vec!["bandersnatch", "jubjubtree", "lorem", "ipsum", "dolor"]
    );

    assert_eq!(data.thing.len(), 2);
    assert_eq!(data.thing[0].name, "momerath");
    assert_eq!(data.thing[0].size, 123);
    assert_eq!(data.thing[1].name, "vorpalsword");
    assert_eq!(data.thing[1].size, 0);

    assert_eq!(data.start.timestamp(), 1_704_074_584);
    assert_eq!(data.elapsed, Duration::from_secs(60));

    assert_eq!(data.param, Thing { name: "jubjubtree".to_string(), size: 234 });

    assert_eq!(data.header["type"], "json");
    assert_eq!(data.header["charset"], "ascii");
    assert_eq!(data.header["length"], "1234");
    assert_eq!(data.header["refer"], "altavista");
    assert_eq!(data.header2["flowrate"], Value::String("high".to_string()));
    assert_eq!(data.header2["refer"], Value::String("altavista".to_string()));
}

#[test]
fn test_reread_is_identical() {
    let first = read_stuff(STUFF).unwrap();
    let second = read_stuff(STUFF).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_existing_values_survive() {
    let mut stuff = Stuff {
        value: 7,
        tag: vec!["old".to_string()],
        ..Stuff::default()
    };
    read_from("tag new\nfield x\n".as_bytes(), &mut stuff).unwrap();
    assert_eq!(stuff.value, 7);
    assert_eq!(stuff.tag, vec!["old", "new"]);
}

#[test]
fn test_keys_ignore_case() {
    let data = read_stuff("FIELD a\nGirth b\nValue 9\n").unwrap();
    assert_eq!(data.field, "a");
    assert_eq!(data.field2, "b");
    assert_eq!(data.value, 9);
}

#[test]
fn test_override_hides_field_name() {
    let err = read_stuff("field2 x\n").unwrap_err();
    assert!(matches!(err.root(), Error::InvalidParam(key) if key == "field2"));
}

#[test]
fn test_quoting() {
    let data = read_stuff("field \"a\\tb\\nc\"\ngirth 'it\\'s a\\tb'\n").unwrap();
    assert_eq!(data.field, "a\tb\nc");
    assert_eq!(data.field2, "it's atb");

    let data = read_stuff("field pre\"fix \"post\n").unwrap();
    assert_eq!(data.field, "prefix post");
}

#[test]
fn test_colon_separator() {
    let data = read_stuff("tag: a b\ntag c: d\n").unwrap();
    assert_eq!(data.tag, vec!["a", "b", "c:", "d"]);
}

#[test]
fn test_missing_value() {
    let mut stuff = Stuff {
        doit: true,
        field: "set".to_string(),
        ..Stuff::default()
    };
    read_from("doit\nfield\n".as_bytes(), &mut stuff).unwrap();
    assert!(!stuff.doit);
    assert_eq!(stuff.field, "");
}

#[test]
fn test_bool_map_block_matches_lines() {
    let lines = read_stuff("flag x\nflag y off\n").unwrap();
    let block = read_stuff("flag {\n x\n y off\n}\n").unwrap();
    assert_eq!(lines.flag, block.flag);
    assert_eq!(lines.flag.len(), 2);
}

#[test]
fn test_set_duplicates() {
    let data = read_stuff("set a\nset b c\nset a\n").unwrap();
    let mut members: Vec<_> = data.set.into_iter().collect();
    members.sort();
    assert_eq!(members, vec!["a", "b", "c"]);
}

#[test]
fn test_duration_month() {
    let data = read_stuff("duration 1m\n").unwrap();
    assert_eq!(data.duration, 2_419_200);
}

#[test]
fn test_duration_unknown_suffix() {
    assert_eq!(read_stuff("duration 10s\n").unwrap().duration, 10);
    assert_eq!(read_stuff("duration 5w\n").unwrap().duration, 5);
}

#[test]
fn test_invalid_param() {
    let err = read_stuff("field ok\nnosuch 1\n").unwrap_err();
    match &err {
        Error::Parse { line, source, .. } => {
            assert_eq!(*line, 2);
            assert!(matches!(**source, Error::InvalidParam(ref key) if key == "nosuch"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.to_string().contains("invalid param 'nosuch'"), "{}", err);
    assert!(err.to_string().contains("<input>"), "{}", err);
}

#[test]
fn test_invalid_section() {
    let err = read_stuff("nosuch {\n}\n").unwrap_err();
    assert!(matches!(err.root(), Error::InvalidSection(key) if key == "nosuch"));
}

#[test]
fn test_section_on_scalar() {
    let err = read_stuff("value {\n}\n").unwrap_err();
    assert!(matches!(
        err.root(),
        Error::InvalidBlockType { shape: Shape::Integer, .. }
    ));
}

#[test]
fn test_string_map_needs_value() {
    let err = read_stuff("header refer\n").unwrap_err();
    assert!(matches!(err.root(), Error::ValueExpected { key, name } if key == "header" && name == "refer"));

    let err = read_stuff("header {\n refer\n}\n").unwrap_err();
    assert!(matches!(err.root(), Error::ValueExpected { .. }));
}

#[test]
fn test_bad_values() {
    for text in [
        "value lots\n",
        "value 9999999999\n",
        "duration 1.5h\n",
        "elapsed 10\n",
        "start yesterday\n",
    ] {
        let err = read_stuff(text).unwrap_err();
        assert!(
            matches!(err.root(), Error::InvalidValue { .. }),
            "{:?}: {}",
            text,
            err
        );
    }
}

#[test]
fn test_error_line_numbers() {
    let err = read_stuff("field a\n\n# note\nthing {\n  name x\n  size big\n}\n").unwrap_err();
    assert!(matches!(err, Error::Parse { line: 6, .. }), "{}", err);
}

#[test]
fn test_unterminated_quote() {
    let err = read_stuff("field \"open\n").unwrap_err();
    assert!(matches!(err.root(), Error::Syntax(_)), "{}", err);
}

#[test]
fn test_unclosed_blocks() {
    let err = read_stuff("param {\n name x\n").unwrap_err();
    assert!(matches!(err.root(), Error::UnclosedBlock(key) if key == "param"));

    let err = read_stuff("header {\n a b\n").unwrap_err();
    assert!(matches!(err.root(), Error::UnclosedBlock(key) if key == "header"));
}

#[test]
fn test_stray_close_at_top_level() {
    let err = read_stuff("}\n").unwrap_err();
    assert!(matches!(err.root(), Error::InvalidParam(key) if key == "}"));
}

#[test]
fn test_partial_section_element_kept() {
    let mut stuff = Stuff::default();
    let result = read_from(
        "thing {\n name first\n}\nthing {\n name second\n size huge\n}\n".as_bytes(),
        &mut stuff,
    );
    assert!(result.is_err());
    assert_eq!(stuff.thing.len(), 2);
    assert_eq!(stuff.thing[1].name, "second");
}

#[test]
fn test_final_line_without_newline() {
    let data = read_stuff("value 5\nfield last").unwrap();
    assert_eq!(data.value, 5);
    assert_eq!(data.field, "last");
}

// Field shapes that cannot hold what the input asks for.

#[test]
fn test_boxed_record_field_rejected() {
    #[derive(Debug, Default)]
    struct Holder {
        param: Box<Thing>,
    }
    accfg::record!(Holder { param });

    let mut data = Holder::default();
    let err = read_from("\nparam {\n    name  slithytove\n}\n".as_bytes(), &mut data).unwrap_err();
    assert!(matches!(err.root(), Error::InvalidBlockType { .. }));
    assert_eq!(data.param.name, "");

    let err = read_from("param lorem-ipsum\n".as_bytes(), &mut data).unwrap_err();
    assert!(matches!(err.root(), Error::UnsupportedType { .. }));
}

#[test]
fn test_numeric_map_block_rejected() {
    #[derive(Debug, Default)]
    struct Holder {
        param: HashMap<String, i32>,
    }
    accfg::record!(Holder { param });

    let mut data = Holder::default();
    let err = read_from("\nparam {\n    name  slithytove\n}\n".as_bytes(), &mut data).unwrap_err();
    assert!(matches!(err.root(), Error::InvalidBlockType { .. }), "{}", err);
    assert!(data.param.is_empty());
}

#[test]
fn test_sequence_of_values() {
    #[derive(Debug, Default)]
    struct Holder {
        param: Vec<i32>,
    }
    accfg::record!(Holder { param });

    let mut data = Holder::default();
    read_from("\nparam 123\nparam 234 567\n".as_bytes(), &mut data).unwrap();
    assert_eq!(data.param, vec![123, 234, 567]);

    let err = read_from("\nparam {\n    123\n    234\n}\n".as_bytes(), &mut data).unwrap_err();
    assert!(matches!(
        err.root(),
        Error::InvalidBlockType { shape: Shape::Sequence, .. }
    ));
}

#[test]
fn test_embedded_record() {
    #[derive(Debug, Default)]
    struct Common {
        name: String,
    }
    accfg::record!(Common { name });

    #[derive(Debug, Default)]
    struct Holder {
        common: Common,
        param: String,
    }
    accfg::record!(Holder { common => embed(), param });

    let mut data = Holder::default();
    read_from("name gizmo\nparam p\n".as_bytes(), &mut data).unwrap();
    assert_eq!(data.common.name, "gizmo");
    assert_eq!(data.param, "p");

    read_from("common {\n name widget\n}\n".as_bytes(), &mut data).unwrap();
    assert_eq!(data.common.name, "widget");
}

#[test]
fn test_custom_parsers() {
    use std::net::{IpAddr, SocketAddr};
    use std::path::PathBuf;

    #[derive(Debug, Default, PartialEq)]
    struct Level(u8);

    impl std::str::FromStr for Level {
        type Err = std::num::ParseIntError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            s.trim_start_matches('L').parse().map(Level)
        }
    }
    accfg::parse_str_field!(Level);

    #[derive(Debug)]
    struct Net {
        addr: IpAddr,
        listen: SocketAddr,
        root: PathBuf,
        level: Level,
        levels: Vec<Level>,
    }
    accfg::record!(Net { addr, listen, root, level, levels });

    let mut net = Net {
        addr: IpAddr::from([0, 0, 0, 0]),
        listen: SocketAddr::from(([0, 0, 0, 0], 0)),
        root: PathBuf::new(),
        level: Level::default(),
        levels: Vec::new(),
    };
    read_from(
        "addr ::1\nlisten 127.0.0.1:8080\nroot /srv/www\nlevel L3\nlevels L1 2\n".as_bytes(),
        &mut net,
    )
    .unwrap();

    assert_eq!(net.addr, "::1".parse::<IpAddr>().unwrap());
    assert_eq!(net.listen.port(), 8080);
    assert_eq!(net.root, PathBuf::from("/srv/www"));
    assert_eq!(net.level, Level(3));
    assert_eq!(net.levels, vec![Level(1), Level(2)]);

    let err = read_from("level high\n".as_bytes(), &mut net).unwrap_err();
    assert!(matches!(err.root(), Error::InvalidValue { key, .. } if key == "level"));
}
