//! Require rewriting.
//!
//! Replaces bundled `require` sites with `__load(...)` calls against the
//! module map emitted by the bundle. External and unresolved sites are left
//! exactly as written; the runtime shim forwards those to the host `require`.

use std::collections::HashMap;

use crate::edit::{apply_edits, SourceEdit};
use crate::requires::{extract_requires, RequireKind};
use crate::scanner::ExcludedRanges;

/// Rewrite every require site whose raw import name appears in `mappings`.
///
/// The mapping value is the bundled module id; the original quote character
/// is preserved. With an empty mapping this is the identity function.
pub fn rewrite_requires(
    source: &str,
    excluded: &ExcludedRanges,
    mappings: &HashMap<String, String>,
) -> String {
    let mut edits = Vec::new();
    for site in extract_requires(source, excluded) {
        let Some(module_id) = mappings.get(&site.module_name) else {
            continue;
        };
        let q = site.quote;
        let replacement = match site.kind {
            RequireKind::Standard | RequireKind::Compact => {
                format!("__load({q}{module_id}{q})")
            }
            RequireKind::Pcall => format!("pcall(__load, {q}{module_id}{q})"),
        };
        edits.push(SourceEdit::replace(
            site.byte_offset,
            site.byte_end(),
            replacement,
        ));
    }
    apply_edits(source, edits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(source: &str, mappings: &[(&str, &str)]) -> String {
        let map: HashMap<String, String> = mappings
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        rewrite_requires(source, &ExcludedRanges::scan(source), &map)
    }

    #[test]
    fn empty_mapping_is_identity() {
        let src = "local a = require('./u')\nlocal b = require('samp.events')";
        assert_eq!(rewrite(src, &[]), src);
    }

    #[test]
    fn standard_site_becomes_load() {
        let out = rewrite("local u = require('./u')", &[("./u", "u")]);
        assert_eq!(out, "local u = __load('u')");
    }

    #[test]
    fn double_quotes_are_preserved() {
        let out = rewrite(r#"local u = require("./u")"#, &[("./u", "u")]);
        assert_eq!(out, r#"local u = __load("u")"#);
    }

    #[test]
    fn compact_site_becomes_load() {
        let out = rewrite("local u = require './lib/helper'", &[("./lib/helper", "lib/helper")]);
        assert_eq!(out, "local u = __load('lib/helper')");
    }

    #[test]
    fn pcall_site_keeps_protected_call() {
        let out = rewrite(r#"local ok, m = pcall(require, "./u")"#, &[("./u", "u")]);
        assert_eq!(out, r#"local ok, m = pcall(__load, "u")"#);
    }

    #[test]
    fn external_pcall_is_untouched() {
        let src = r#"local ok, m = pcall(require, "samp.events")"#;
        assert_eq!(rewrite(src, &[("./u", "u")]), src);
    }

    #[test]
    fn external_site_is_untouched_next_to_bundled() {
        let src = "local x = require('samp.events')\nlocal y = require('./u')";
        let out = rewrite(src, &[("./u", "u")]);
        assert_eq!(out, "local x = require('samp.events')\nlocal y = __load('u')");
    }

    #[test]
    fn masked_site_is_untouched() {
        let src = "-- require('./u')\nlocal s = \"require('./u')\"";
        assert_eq!(rewrite(src, &[("./u", "u")]), src);
    }

    #[test]
    fn multiple_sites_rewrite_independently() {
        let src = "local a = require('./a')\nlocal b = require('./b')";
        let out = rewrite(src, &[("./a", "a"), ("./b", "b")]);
        assert_eq!(out, "local a = __load('a')\nlocal b = __load('b')");
    }
}
