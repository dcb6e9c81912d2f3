//! Helper function library exposed to templates.
//!
//! Every function is pure and deterministic: no I/O, no clock, no
//! randomness. The only "state" a function can touch is the frozen
//! namespace reachable through [`Exec`], which `include` and `tpl` use to
//! re-enter the engine.
//!
//! Argument coercion is lenient where the original engine was lenient
//! (scalar arguments stringify) and typed where it was typed (`required`
//! messages, `include` names, `printf` formats must be strings).

use serde_json::{Map, Value};

use crate::render::{Exec, stringify};

pub(crate) type Func = fn(&Exec<'_>, &[Value]) -> Result<Value, String>;

pub(crate) fn lookup(name: &str) -> Option<Func> {
    Some(match name {
        // control helpers
        "default" => default_value,
        "required" => required,
        "ternary" => ternary,
        "empty" => empty,
        "coalesce" => coalesce,
        "fail" => fail,
        // structural conversion
        "toYaml" => to_yaml,
        "toJson" => to_json,
        "toPrettyJson" => to_pretty_json,
        "list" => list,
        "dict" => dict,
        // indentation
        "indent" => indent,
        "nindent" => nindent,
        // strings
        "upper" => upper,
        "lower" => lower,
        "title" => title,
        "trim" => trim,
        "trimPrefix" => trim_prefix,
        "trimSuffix" => trim_suffix,
        "contains" => contains,
        "hasPrefix" => has_prefix,
        "hasSuffix" => has_suffix,
        "replace" => replace,
        "repeat" => repeat,
        "join" => join,
        "split" => split,
        "quote" => quote,
        "squote" => squote,
        "printf" => printf,
        // engine re-entry
        "include" => include,
        "tpl" => tpl,
        _ => return None,
    })
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn want(name: &str, args: &[Value], n: usize) -> Result<(), String> {
    if args.len() == n {
        Ok(())
    } else {
        Err(format!("{name} expects {n} argument(s), got {}", args.len()))
    }
}

fn typed_str<'a>(name: &str, what: &str, value: &'a Value) -> Result<&'a str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("{name}: {what} must be a string"))
}

fn count(name: &str, value: &Value) -> Result<usize, String> {
    value
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| format!("{name}: count must be a non-negative integer"))
}

/// The emptiness notion `default`/`required`/`coalesce` share: nil or the
/// empty string. Numeric zero is deliberately NOT empty.
fn is_nil_or_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(m) => !m.is_empty(),
    }
}

fn quote_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Control helpers
// ---------------------------------------------------------------------------

fn default_value(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("default", args, 2)?;
    if is_nil_or_empty(&args[1]) {
        Ok(args[0].clone())
    } else {
        Ok(args[1].clone())
    }
}

fn required(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("required", args, 2)?;
    let message = typed_str("required", "message", &args[0])?;
    if is_nil_or_empty(&args[1]) {
        Err(message.to_string())
    } else {
        Ok(args[1].clone())
    }
}

fn ternary(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("ternary", args, 3)?;
    if truthy(&args[2]) {
        Ok(args[0].clone())
    } else {
        Ok(args[1].clone())
    }
}

fn empty(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("empty", args, 1)?;
    let is_empty = match &args[0] {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
        _ => false,
    };
    Ok(Value::Bool(is_empty))
}

fn coalesce(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    for value in args {
        if !is_nil_or_empty(value) {
            return Ok(value.clone());
        }
    }
    Ok(Value::Null)
}

fn fail(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("fail", args, 1)?;
    Err(stringify(&args[0]))
}

// ---------------------------------------------------------------------------
// Structural conversion
// ---------------------------------------------------------------------------

fn to_yaml(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("toYaml", args, 1)?;
    let yaml = serde_yaml::to_string(&args[0])
        .map(|s| s.trim_end_matches('\n').to_string())
        .unwrap_or_default();
    Ok(Value::String(yaml))
}

fn to_json(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("toJson", args, 1)?;
    Ok(Value::String(
        serde_json::to_string(&args[0]).unwrap_or_default(),
    ))
}

fn to_pretty_json(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("toPrettyJson", args, 1)?;
    Ok(Value::String(
        serde_json::to_string_pretty(&args[0]).unwrap_or_default(),
    ))
}

fn list(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    Ok(Value::Array(args.to_vec()))
}

/// Builds a string-keyed mapping from `k, v` pairs. A non-string key or an
/// odd trailing argument is silently dropped -- engine-compatibility
/// looseness, kept deliberately rather than hardened to fail fast.
fn dict(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    let mut map = Map::new();
    for pair in args.chunks(2) {
        if let [Value::String(key), value] = pair {
            map.insert(key.clone(), value.clone());
        }
    }
    Ok(Value::Object(map))
}

// ---------------------------------------------------------------------------
// Indentation
// ---------------------------------------------------------------------------

fn indent_lines(n: usize, text: &str) -> String {
    let pad = " ".repeat(n);
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("indent", args, 2)?;
    let n = count("indent", &args[0])?;
    Ok(Value::String(indent_lines(n, &stringify(&args[1]))))
}

fn nindent(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("nindent", args, 2)?;
    let n = count("nindent", &args[0])?;
    Ok(Value::String(format!(
        "\n{}",
        indent_lines(n, &stringify(&args[1]))
    )))
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

fn upper(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("upper", args, 1)?;
    Ok(Value::String(stringify(&args[0]).to_uppercase()))
}

fn lower(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("lower", args, 1)?;
    Ok(Value::String(stringify(&args[0]).to_lowercase()))
}

fn title(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("title", args, 1)?;
    let text = stringify(&args[0]);
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    Ok(Value::String(out))
}

fn trim(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("trim", args, 1)?;
    Ok(Value::String(stringify(&args[0]).trim().to_string()))
}

fn trim_prefix(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("trimPrefix", args, 2)?;
    let s = stringify(&args[0]);
    let prefix = stringify(&args[1]);
    Ok(Value::String(
        s.strip_prefix(&prefix).unwrap_or(&s).to_string(),
    ))
}

fn trim_suffix(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("trimSuffix", args, 2)?;
    let s = stringify(&args[0]);
    let suffix = stringify(&args[1]);
    Ok(Value::String(
        s.strip_suffix(&suffix).unwrap_or(&s).to_string(),
    ))
}

fn contains(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("contains", args, 2)?;
    Ok(Value::Bool(
        stringify(&args[0]).contains(&stringify(&args[1])),
    ))
}

fn has_prefix(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("hasPrefix", args, 2)?;
    Ok(Value::Bool(
        stringify(&args[0]).starts_with(&stringify(&args[1])),
    ))
}

fn has_suffix(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("hasSuffix", args, 2)?;
    Ok(Value::Bool(
        stringify(&args[0]).ends_with(&stringify(&args[1])),
    ))
}

fn replace(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("replace", args, 3)?;
    let s = stringify(&args[0]);
    Ok(Value::String(
        s.replace(&stringify(&args[1]), &stringify(&args[2])),
    ))
}

fn repeat(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("repeat", args, 2)?;
    let n = count("repeat", &args[1])?;
    Ok(Value::String(stringify(&args[0]).repeat(n)))
}

fn join(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("join", args, 2)?;
    let items = args[0]
        .as_array()
        .ok_or("join: first argument must be a sequence")?;
    let sep = stringify(&args[1]);
    let joined = items.iter().map(stringify).collect::<Vec<_>>().join(&sep);
    Ok(Value::String(joined))
}

fn split(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("split", args, 2)?;
    let s = stringify(&args[0]);
    let sep = stringify(&args[1]);
    let parts = s
        .split(sep.as_str())
        .map(|p| Value::String(p.to_string()))
        .collect();
    Ok(Value::Array(parts))
}

fn quote(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("quote", args, 1)?;
    Ok(Value::String(quote_str(&stringify(&args[0]))))
}

fn squote(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("squote", args, 1)?;
    Ok(Value::String(format!("'{}'", stringify(&args[0]))))
}

fn printf(_: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    let format = args
        .first()
        .ok_or("printf expects a format string")
        .and_then(|v| v.as_str().ok_or("printf: format must be a string"))?;
    let mut rest = &args[1..];
    let mut out = String::new();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(verb @ ('s' | 'd' | 'v' | 'q')) => {
                let (arg, tail) = rest
                    .split_first()
                    .ok_or_else(|| format!("printf: missing argument for %{verb}"))?;
                rest = tail;
                match verb {
                    's' | 'v' => out.push_str(&stringify(arg)),
                    'd' => match arg.as_i64() {
                        Some(n) => out.push_str(&n.to_string()),
                        None => return Err("printf: %d expects an integer".to_string()),
                    },
                    'q' => out.push_str(&quote_str(&stringify(arg))),
                    _ => unreachable!(),
                }
            }
            Some(other) => return Err(format!("printf: unsupported verb %{other}")),
            None => return Err("printf: trailing %".to_string()),
        }
    }
    Ok(Value::String(out))
}

// ---------------------------------------------------------------------------
// Engine re-entry
// ---------------------------------------------------------------------------

fn include(exec: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("include", args, 2)?;
    let name = typed_str("include", "name", &args[0])?;
    exec.include(name, &args[1]).map(Value::String)
}

fn tpl(exec: &Exec<'_>, args: &[Value]) -> Result<Value, String> {
    want("tpl", args, 2)?;
    let raw = typed_str("tpl", "template", &args[0])?;
    exec.template_str(raw, &args[1]).map(Value::String)
}

#[cfg(test)]
mod tests {
    use crate::namespace::NamespaceBuilder;
    use serde_json::json;

    fn render(source: &str, ctx: serde_json::Value) -> Result<String, String> {
        NamespaceBuilder::new()
            .build()
            .render("test.yaml", source, &ctx)
            .map_err(|e| e.to_string())
    }

    #[test]
    fn default_replaces_nil_and_empty_string_only() {
        let ctx = json!({"V": {"empty": "", "zero": 0, "set": "x"}});
        assert_eq!(render("{{ default \"fb\" .V.missing }}", ctx.clone()).unwrap(), "fb");
        assert_eq!(render("{{ default \"fb\" .V.empty }}", ctx.clone()).unwrap(), "fb");
        // numeric zero is not empty
        assert_eq!(render("{{ default \"fb\" .V.zero }}", ctx.clone()).unwrap(), "0");
        assert_eq!(render("{{ default \"fb\" .V.set }}", ctx).unwrap(), "x");
    }

    #[test]
    fn required_trips_with_its_message() {
        let err = render("{{ required \"image tag is required\" .V.tag }}", json!({})).unwrap_err();
        assert!(err.contains("image tag is required"), "{err}");
        assert_eq!(
            render("{{ required \"msg\" .V.tag }}", json!({"V": {"tag": "1.2"}})).unwrap(),
            "1.2"
        );
    }

    #[test]
    fn ternary_selects_on_truthiness() {
        assert_eq!(render("{{ ternary \"a\" \"b\" true }}", json!({})).unwrap(), "a");
        assert_eq!(render("{{ ternary \"a\" \"b\" false }}", json!({})).unwrap(), "b");
        assert_eq!(
            render("{{ ternary \"a\" \"b\" .V.on }}", json!({"V": {"on": 1}})).unwrap(),
            "a"
        );
    }

    #[test]
    fn empty_covers_all_container_shapes() {
        let ctx = json!({"V": {"s": "", "l": [], "m": {}, "n": 0, "full": [1]}});
        assert_eq!(render("{{ empty .V.missing }}", ctx.clone()).unwrap(), "true");
        assert_eq!(render("{{ empty .V.s }}", ctx.clone()).unwrap(), "true");
        assert_eq!(render("{{ empty .V.l }}", ctx.clone()).unwrap(), "true");
        assert_eq!(render("{{ empty .V.m }}", ctx.clone()).unwrap(), "true");
        assert_eq!(render("{{ empty .V.n }}", ctx.clone()).unwrap(), "false");
        assert_eq!(render("{{ empty .V.full }}", ctx).unwrap(), "false");
    }

    #[test]
    fn coalesce_takes_the_first_usable_value() {
        let ctx = json!({"V": {"b": "", "c": "hit", "d": "later"}});
        assert_eq!(render("{{ coalesce .V.a .V.b .V.c .V.d }}", ctx).unwrap(), "hit");
        assert_eq!(render("[{{ coalesce .V.a .V.b }}]", json!({})).unwrap(), "[]");
    }

    #[test]
    fn to_yaml_emits_real_yaml() {
        let ctx = json!({"V": {"cfg": {"ports": [80], "name": "web"}}});
        let out = render("{{ toYaml .V.cfg }}", ctx).unwrap();
        assert!(out.contains("name: web"), "{out}");
        assert!(out.contains("- 80"), "{out}");
        assert!(!out.ends_with('\n'));
        // YAML, not a JSON fallback
        assert!(!out.contains('{'), "{out}");
    }

    #[test]
    fn json_conversions() {
        let ctx = json!({"V": {"m": {"a": 1}}});
        assert_eq!(render("{{ toJson .V.m }}", ctx.clone()).unwrap(), "{\"a\":1}");
        let pretty = render("{{ toPrettyJson .V.m }}", ctx).unwrap();
        assert!(pretty.contains("\n  \"a\": 1"), "{pretty}");
    }

    #[test]
    fn indent_prefixes_non_empty_lines_only() {
        let ctx = json!({"V": {"s": "a\n\nb"}});
        assert_eq!(render("{{ indent 2 .V.s }}", ctx.clone()).unwrap(), "  a\n\n  b");
        assert_eq!(render("{{ nindent 2 .V.s }}", ctx).unwrap(), "\n  a\n\n  b");
    }

    #[test]
    fn indent_composes_with_to_yaml_in_a_pipeline() {
        let ctx = json!({"V": {"cfg": {"a": 1}}});
        assert_eq!(
            render("data:{{ .V.cfg | toYaml | nindent 2 }}", ctx).unwrap(),
            "data:\n  a: 1"
        );
    }

    #[test]
    fn list_and_dict_build_structures() {
        assert_eq!(render("{{ list 1 2 3 | toJson }}", json!({})).unwrap(), "[1,2,3]");
        assert_eq!(
            render("{{ dict \"a\" 1 \"b\" 2 | toJson }}", json!({})).unwrap(),
            "{\"a\":1,\"b\":2}"
        );
    }

    #[test]
    fn dict_silently_drops_malformed_pairs() {
        // odd trailing argument
        assert_eq!(render("{{ dict \"a\" 1 \"b\" | toJson }}", json!({})).unwrap(), "{\"a\":1}");
        // non-string key
        assert_eq!(render("{{ dict 1 \"v\" \"a\" 2 | toJson }}", json!({})).unwrap(), "{\"a\":2}");
    }

    #[test]
    fn string_helpers() {
        assert_eq!(render("{{ upper \"abc\" }}", json!({})).unwrap(), "ABC");
        assert_eq!(render("{{ lower \"ABC\" }}", json!({})).unwrap(), "abc");
        assert_eq!(render("{{ title \"hello world\" }}", json!({})).unwrap(), "Hello World");
        assert_eq!(render("{{ trim \"  x  \" }}", json!({})).unwrap(), "x");
        assert_eq!(render("{{ trimPrefix \"abc\" \"a\" }}", json!({})).unwrap(), "bc");
        assert_eq!(render("{{ trimSuffix \"abc\" \"c\" }}", json!({})).unwrap(), "ab");
        assert_eq!(render("{{ contains \"abc\" \"b\" }}", json!({})).unwrap(), "true");
        assert_eq!(render("{{ hasPrefix \"abc\" \"a\" }}", json!({})).unwrap(), "true");
        assert_eq!(render("{{ hasSuffix \"abc\" \"a\" }}", json!({})).unwrap(), "false");
        assert_eq!(render("{{ replace \"a-b\" \"-\" \"_\" }}", json!({})).unwrap(), "a_b");
        assert_eq!(render("{{ repeat \"ab\" 3 }}", json!({})).unwrap(), "ababab");
        assert_eq!(render("{{ quote \"a\" }}", json!({})).unwrap(), "\"a\"");
        assert_eq!(render("{{ squote \"a\" }}", json!({})).unwrap(), "'a'");
    }

    #[test]
    fn join_and_split() {
        let ctx = json!({"V": {"l": ["a", "b", 3]}});
        assert_eq!(render("{{ join .V.l \",\" }}", ctx).unwrap(), "a,b,3");
        assert_eq!(
            render("{{ split \"a,b\" \",\" | toJson }}", json!({})).unwrap(),
            "[\"a\",\"b\"]"
        );
    }

    #[test]
    fn printf_subset() {
        assert_eq!(
            render("{{ printf \"%s-%d-%v\" \"a\" 2 true }}", json!({})).unwrap(),
            "a-2-true"
        );
        assert_eq!(render("{{ printf \"%q\" \"a\" }}", json!({})).unwrap(), "\"a\"");
        assert_eq!(render("{{ printf \"100%%\" }}", json!({})).unwrap(), "100%");
        assert!(render("{{ printf \"%x\" 1 }}", json!({})).is_err());
        assert!(render("{{ printf \"%d\" \"x\" }}", json!({})).is_err());
    }

    #[test]
    fn fail_aborts_the_file() {
        let err = render("{{ fail \"boom\" }}", json!({})).unwrap_err();
        assert!(err.contains("boom"));
    }

    #[test]
    fn quote_composes_in_pipelines() {
        let ctx = json!({"V": {"tag": ""}});
        assert_eq!(
            render("tag: {{ .V.tag | default \"latest\" | quote }}", ctx).unwrap(),
            "tag: \"latest\""
        );
    }
}
