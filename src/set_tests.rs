//! Tests for option sets.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use tempfile::TempDir;

use crate::option::OptionError;
use crate::{ConfigMap, Error, Opt, OptionSet};

/// Helper to create a set over `args` with an empty environment
fn set<'a>(args: &[&str]) -> OptionSet<'a> {
    set_with_env(args, &[])
}

/// Helper to create a set over `args` with the given environment
fn set_with_env<'a>(args: &[&str], env: &[(&str, &str)]) -> OptionSet<'a> {
    let env: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    OptionSet::new("test", args.iter().copied())
        .with_environment(env)
}

/// Helper to write a config file into a fresh temp dir
fn config_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

mod parse {
    use super::*;

    #[test]
    fn default_only() {
        let mut v = String::new();
        let mut opts = set(&[]);
        opts.add(
            Opt::new(&mut v, "test option")
                .flags('f', "flag")
                .default("default value"),
        );
        opts.parse(None).unwrap();
        drop(opts);

        assert_eq!(v, "default value");
    }

    #[test]
    fn long_flag_count() {
        let mut count = 0i32;
        let mut opts = set(&["--count", "5"]);
        opts.add(Opt::new(&mut count, "count").long_flag("count").default(1));
        opts.parse(Some(&ConfigMap::new())).unwrap();
        drop(opts);

        assert_eq!(count, 5);
    }

    #[test]
    fn short_flag() {
        let mut v = String::new();
        let mut opts = set(&["-f", "test"]);
        opts.add(Opt::new(&mut v, "test option").short_flag('f'));
        opts.parse(None).unwrap();
        drop(opts);

        assert_eq!(v, "test");
    }

    #[test]
    fn equals_syntax() {
        let mut v = String::new();
        let mut opts = set(&["--flag=test"]);
        opts.add(Opt::new(&mut v, "test option").flags('f', "flag"));
        opts.parse(None).unwrap();
        drop(opts);

        assert_eq!(v, "test");
    }

    #[test]
    fn every_kind_from_flags() {
        let mut boolean = false;
        let mut integer = 0i32;
        let mut long = 0i64;
        let mut unsigned = 0u32;
        let mut unsigned_long = 0u64;
        let mut float = 0f64;
        let mut text = String::new();
        let mut duration = Duration::ZERO;

        let mut opts = set(&[
            "-b",
            "-i",
            "1",
            "-l",
            "2",
            "-u",
            "3",
            "--unsignedLong",
            "4",
            "-f",
            "5.6",
            "-t",
            "words",
            "-d",
            "60s",
        ]);
        opts.add(Opt::new(&mut boolean, "boolean").flags('b', "boolean"));
        opts.add(Opt::new(&mut integer, "integer").flags('i', "integer"));
        opts.add(Opt::new(&mut long, "long").flags('l', "long"));
        opts.add(Opt::new(&mut unsigned, "unsigned").flags('u', "unsigned"));
        opts.add(
            Opt::new(&mut unsigned_long, "unsignedLong")
                .flags('z', "unsignedLong"),
        );
        opts.add(Opt::new(&mut float, "float").flags('f', "float"));
        opts.add(Opt::new(&mut text, "text").flags('t', "text"));
        opts.add(Opt::new(&mut duration, "duration").flags('d', "duration"));
        opts.parse(None).unwrap();
        drop(opts);

        assert!(boolean);
        assert_eq!(integer, 1);
        assert_eq!(long, 2);
        assert_eq!(unsigned, 3);
        assert_eq!(unsigned_long, 4);
        assert!((float - 5.6).abs() < f64::EPSILON);
        assert_eq!(text, "words");
        assert_eq!(duration, Duration::from_secs(60));
    }

    #[test]
    fn explicit_false_bool() {
        let mut verbose = true;
        let mut opts = set(&["--verbose=false"]);
        opts.add(
            Opt::new(&mut verbose, "verbose")
                .flags('v', "verbose")
                .default(true),
        );
        opts.parse(None).unwrap();
        drop(opts);

        assert!(!verbose);
    }

    #[test]
    fn negative_value_is_taken_as_value() {
        let mut offset = 0i64;
        let mut opts = set(&["--offset", "-3"]);
        opts.add(Opt::new(&mut offset, "offset").long_flag("offset"));
        opts.parse(None).unwrap();
        drop(opts);

        assert_eq!(offset, -3);
    }

    #[test]
    fn precedence_through_set() {
        let run = |args: &[&str], config: &ConfigMap, env: &[(&str, &str)]| {
            let mut port = 0u32;
            let mut opts = set_with_env(args, env);
            opts.add(
                Opt::new(&mut port, "port")
                    .long_flag("port")
                    .config_key("port")
                    .env_var("PORT")
                    .default(1u32),
            );
            opts.parse(Some(config)).unwrap();
            drop(opts);
            port
        };
        let mut config = ConfigMap::new();
        config.insert("port".to_string(), serde_json::json!(3));
        let env = [("PORT", "2")];

        assert_eq!(run(&["--port", "4"], &config, &env), 4);
        assert_eq!(run(&[], &config, &env), 3);
        assert_eq!(run(&[], &ConfigMap::new(), &env), 2);
        assert_eq!(run(&[], &ConfigMap::new(), &[]), 1);
    }

    #[test]
    fn parsing_twice_is_allowed() {
        let mut count = 0i32;
        let mut opts = set(&["--count", "5"]);
        opts.add(Opt::new(&mut count, "count").long_flag("count"));
        opts.parse(None).unwrap();
        opts.parse(None).unwrap();
        drop(opts);

        assert_eq!(count, 5);
    }
}

mod parse_errors {
    use super::*;

    #[test]
    fn undefined_flag() {
        let mut opts = set(&["--undefined"]);
        let err = opts.parse(None).unwrap_err();

        let Error::Flags(flag_err) = &err else {
            panic!("expected a flag error, got {err}");
        };
        assert_eq!(flag_err.kind(), ErrorKind::UnknownArgument);
        let message = err.to_string();
        assert!(message.starts_with("failed to parse flags: "), "{message}");
        assert!(message.contains("--undefined"), "{message}");
    }

    #[test]
    fn malformed_flag_value() {
        let mut count = 0i32;
        let mut opts = set(&["--count", "five"]);
        opts.add(Opt::new(&mut count, "count").long_flag("count"));

        let err = opts.parse(None).unwrap_err();
        let Error::Flags(flag_err) = &err else {
            panic!("expected a flag error, got {err}");
        };
        assert_eq!(flag_err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn missing_flag_value() {
        let mut count = 0i32;
        let mut opts = set(&["--count"]);
        opts.add(Opt::new(&mut count, "count").long_flag("count"));

        assert!(matches!(opts.parse(None), Err(Error::Flags(_))));
    }

    #[test]
    fn registration_error_aborts() {
        let mut bad = String::new();
        let mut good = 0i32;
        let mut opts = set(&[]);
        opts.add(Opt::new(&mut bad, "bad").short_flag('s').default(1));
        opts.add(Opt::new(&mut good, "good").default(9));

        let err = opts.parse(None).unwrap_err();
        assert!(matches!(err, Error::Register(OptionError::Flag { .. })));
        assert!(err.to_string().starts_with("failed to register flags: "));
        drop(opts);

        assert_eq!(good, 0);
    }

    #[test]
    fn resolution_error_short_circuits() {
        let mut first = 0i32;
        let mut second = 0i32;
        let mut third = 0i32;
        let mut opts = set_with_env(&[], &[("BROKEN", "nope")]);
        opts.add(Opt::new(&mut first, "first").default(1));
        opts.add(Opt::new(&mut second, "second").env_var("BROKEN"));
        opts.add(Opt::new(&mut third, "third").default(3));

        let err = opts.parse(None).unwrap_err();
        assert!(matches!(err, Error::Resolve(OptionError::Env { .. })));
        assert!(err.to_string().starts_with("error parsing options: "));
        drop(opts);

        assert_eq!(first, 1);
        assert_eq!(second, 0);
        assert_eq!(third, 0);
    }

    #[test]
    fn unbound_option_fails_resolution() {
        let mut opts = set(&[]);
        opts.add(Opt::unbound("invalid").config_key("key"));

        let err = opts.parse(None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "error parsing options: option with description 'invalid' not registered with a value"
        );
    }
}

mod parse_using {
    use super::*;

    #[test]
    fn mixed_sources() {
        let (_dir, path) = config_file(
            "config.json",
            r#"{"numeric": 4, "overridden": "from config"}"#,
        );
        let path_arg = path.to_str().unwrap().to_owned();

        let mut config = String::new();
        let mut numeric = 0i32;
        let mut text = String::new();
        let mut overridden = String::new();

        let mut opts = set(&["-f", &path_arg, "-o", "overridden"]);
        opts.add(
            Opt::new(&mut text, "from environment")
                .env_var("UNSET_ENV_VAR")
                .default("unset"),
        );
        opts.add(Opt::new(&mut numeric, "from config").config_key("numeric"));
        opts.add(
            Opt::new(&mut overridden, "overridden value")
                .config_key("overridden")
                .short_flag('o'),
        );
        let path_opt = opts.add(Opt::new(&mut config, "config file").short_flag('f'));
        opts.parse_using(Some(path_opt)).unwrap();
        drop(opts);

        assert_eq!(config, path_arg);
        assert_eq!(numeric, 4);
        assert_eq!(text, "unset");
        assert_eq!(overridden, "overridden");
    }

    #[test]
    fn numeric_from_config() {
        let (_dir, path) = config_file("options.json", r#"{"numeric": 4}"#);

        let mut numeric = 0i32;
        let mut config = String::new();
        let mut opts = set(&[]);
        opts.add(
            Opt::new(&mut numeric, "numeric")
                .long_flag("numeric")
                .config_key("numeric"),
        );
        let path_opt = opts.add(
            Opt::new(&mut config, "config file")
                .default(path.to_str().unwrap()),
        );
        opts.parse_using(Some(path_opt)).unwrap();
        drop(opts);

        assert_eq!(numeric, 4);
    }

    #[test]
    fn path_from_environment() {
        let (_dir, path) = config_file("options.toml", "message = \"hello\"\n");

        let mut message = String::new();
        let mut config = String::new();
        let mut opts = set_with_env(&[], &[("APP_CONFIG", path.to_str().unwrap())]);
        opts.add(Opt::new(&mut message, "message").config_key("message"));
        let path_opt = opts.add(Opt::new(&mut config, "config file").env_var("APP_CONFIG"));
        opts.parse_using(Some(path_opt)).unwrap();
        drop(opts);

        assert_eq!(message, "hello");
    }

    #[test]
    fn no_path_option() {
        let mut v = String::new();
        let mut opts = set(&["-f", "test"]);
        opts.add(Opt::new(&mut v, "test option").short_flag('f'));
        opts.parse_using(None).unwrap();
        drop(opts);

        assert_eq!(v, "test");
    }

    #[test]
    fn empty_path_reads_nothing() {
        let mut config = String::new();
        let mut opts = set(&[]);
        let path_opt = opts.add(Opt::new(&mut config, "option").long_flag("config"));

        assert!(opts.parse_using(Some(path_opt)).is_ok());
    }

    #[test]
    fn invalid_flags() {
        let mut config = String::new();
        let mut opts = set(&["--undefined"]);
        let path_opt = opts.add(Opt::new(&mut config, "config"));

        assert!(matches!(
            opts.parse_using(Some(path_opt)),
            Err(Error::Flags(_))
        ));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("invalid");
        let missing_arg = missing.to_str().unwrap().to_owned();

        let mut config = String::new();
        let mut opts = set(&["--config", &missing_arg]);
        let path_opt = opts.add(Opt::new(&mut config, "config").long_flag("config"));

        let err = opts.parse_using(Some(path_opt)).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
        assert!(err.to_string().starts_with("error reading config "));
    }

    #[test]
    fn top_level_array_is_decode_error() {
        let (_dir, path) = config_file("invalid.json", r#"["not", "an", "object"]"#);
        let path_arg = path.to_str().unwrap().to_owned();

        let mut config = String::new();
        let mut opts = set(&["--config", &path_arg]);
        let path_opt = opts.add(Opt::new(&mut config, "config").long_flag("config"));

        let err = opts.parse_using(Some(path_opt)).unwrap_err();
        assert!(matches!(err, Error::JsonDecode { .. }));
        assert!(err.to_string().starts_with("error parsing config "));
    }

    #[test]
    fn incorrect_config_type() {
        let (_dir, path) = config_file("incorrect.json", r#"{"key": "text"}"#);
        let path_arg = path.to_str().unwrap().to_owned();

        let mut file = String::new();
        let mut value = 0i32;
        let mut opts = set(&["--config", &path_arg]);
        let path_opt = opts.add(Opt::new(&mut file, "config").long_flag("config"));
        opts.add(Opt::new(&mut value, "value").config_key("key"));

        let err = opts.parse_using(Some(path_opt)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "error parsing options: failed to parse option config: \
             cannot convert config type string to int32 for 'key'"
        );
    }

    #[test]
    fn non_string_path_option() {
        let mut config = 0i32;
        let mut opts = set(&[]);
        let path_opt = opts.add(Opt::new(&mut config, "config").default(1));

        let err = opts.parse_using(Some(path_opt)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to read path for config file: failed to set option: \
             invalid cast of int32 to string"
        );
    }

    #[test]
    fn path_option_can_be_set_from_config() {
        let (_dir, path) = config_file("config.json", r#"{"config": "elsewhere.json"}"#);
        let path_arg = path.to_str().unwrap().to_owned();

        let mut config = String::new();
        let mut opts = set(&["-c", &path_arg]);
        let path_opt = opts.add(
            Opt::new(&mut config, "config")
                .short_flag('c')
                .config_key("config"),
        );
        opts.parse_using(Some(path_opt)).unwrap();
        drop(opts);

        // The flag still outranks the file's own entry.
        assert_eq!(config, path_arg);
    }
}

mod positional_args {
    use super::*;

    #[test]
    fn empty_before_parse() {
        let opts = set(&["command"]);
        assert_eq!(opts.narg(), 0);
        assert!(opts.args().is_empty());
    }

    #[test]
    fn remaining_after_parse() {
        let mut opts = set(&["command"]);
        opts.parse(None).unwrap();

        assert_eq!(opts.narg(), 1);
        assert_eq!(opts.args(), ["command"]);
    }

    #[test]
    fn parsing_stops_at_first_positional() {
        let mut count = 0i32;
        let mut opts = set(&["--count", "5", "run", "--count", "6"]);
        opts.add(Opt::new(&mut count, "count").long_flag("count"));
        opts.parse(None).unwrap();

        assert_eq!(opts.args(), ["run", "--count", "6"]);
        drop(opts);
        assert_eq!(count, 5);
    }

    #[test]
    fn double_dash_ends_flags() {
        let mut opts = set(&["--", "--not-a-flag"]);
        opts.parse(None).unwrap();

        assert_eq!(opts.args(), ["--not-a-flag"]);
    }
}

mod usage {
    use super::*;

    #[test]
    fn no_options() {
        let opts = set(&[]);
        assert!(opts.is_empty());
        assert!(opts.usage_string().contains("No configuration options set"));
    }

    #[test]
    fn empty_set_parses() {
        let mut opts = set(&[]);
        assert!(opts.parse(None).is_ok());
    }

    #[test]
    fn options_in_insertion_order() {
        let mut opts = set(&[]);
        opts.add(Opt::unbound("Second option").long_flag("zeta"));
        opts.add(Opt::unbound("First option").long_flag("alpha"));
        let s = opts.usage_string();

        let zeta = s.find("--zeta").unwrap();
        let alpha = s.find("--alpha").unwrap();
        assert!(zeta < alpha);
        assert!(!s.contains("No configuration options set"));
    }

    #[test]
    fn header_names_program() {
        let mut opts = set(&[]);
        opts.add(Opt::unbound("Test option"));

        let mut out = Vec::new();
        opts.write_usage(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Usage of test:\n"));
        assert!(text.contains("Test option"));
    }

    #[test]
    fn usage_does_not_panic() {
        set(&[]).usage();
    }

    #[test]
    fn options_are_retrievable() {
        let mut opts = set(&[]);
        let id = opts.add(Opt::unbound("Test option").env_var("TEST"));

        assert_eq!(opts.len(), 1);
        assert_eq!(opts.option(id).and_then(Opt::env_name), Some("TEST"));
    }
}
