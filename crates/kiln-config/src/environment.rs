//! Environment-derived defaulting, applied after platform defaults and
//! before any command-line option.

use crate::Settings;
use crate::defaults::SUBSTITUTE_URLS_VAR;

/// Seeds environment-derived defaults, then applies the substitution
/// restriction.
///
/// Substituter endpoints are read from `KILN_SUBSTITUTE_URLS` as a
/// whitespace-separated list. Substitution is then disabled unconditionally
/// and the endpoint list cleared, overriding whatever the environment or a
/// later configuration source supplies.
pub(crate) fn apply<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(SUBSTITUTE_URLS_VAR) {
        settings.substitute_urls = raw.split_whitespace().map(str::to_owned).collect();
    }

    // FIXME: lift once substitution works end to end.
    settings.use_substitutes = false;
    settings.substitute_urls.clear();
}
