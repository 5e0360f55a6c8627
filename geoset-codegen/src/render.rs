//! Source text of the generated accessor module.
//!
//! The helper functions are written once as a TypeScript template in which
//! every type-only fragment is wrapped in `«…»`. The TypeScript variant keeps
//! those fragments and the JavaScript variant drops them, so both variants
//! execute the same statements.

use std::collections::BTreeSet;

use geoset_core::CountryCode;

/// Language of the generated module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputMode {
    /// `countries.ts` with static types.
    TypeScript,
    /// `countries.js` without annotations.
    JavaScript,
}

impl OutputMode {
    /// Mode selected by a config's `typescript` flag.
    #[must_use]
    pub const fn from_typescript(typescript: bool) -> Self {
        if typescript {
            Self::TypeScript
        } else {
            Self::JavaScript
        }
    }

    /// File name of the generated module.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::TypeScript => "countries.ts",
            Self::JavaScript => "countries.js",
        }
    }

    const fn keeps_types(self) -> bool {
        matches!(self, Self::TypeScript)
    }
}

const HEADER: &str = "// Generated by geoset. Do not edit by hand.\n";

const TYPES: &str = r"
export type LocalizedName = Record<string, string>;

export interface City {
  name: LocalizedName;
  latitude?: number;
  longitude?: number;
}

export interface Region {
  code: string;
  name: LocalizedName;
  cities: City[];
}

export interface Country {
  code: string;
  iso3?: string;
  name: LocalizedName;
  phone: string;
  currency: string;
  timezone: string;
  flag: string;
  regions: Region[];
}
";

pub(crate) const HELPERS: &str = r#"
function has(target«: object», key«: string»)«: boolean» {
  return Object.prototype.hasOwnProperty.call(target, key);
}

function normalise(code«: unknown»)«: CountryCode | undefined» {
  if (typeof code !== "string") {
    return undefined;
  }
  const key = code.toUpperCase();
  return has(countries, key) ? (key« as CountryCode») : undefined;
}

export function isValidCountryCode(code«: unknown»)«: code is CountryCode» {
  return normalise(code) !== undefined;
}

export function getCountry(code«: string»)«: Country | undefined» {
  const key = normalise(code);
  return key === undefined ? undefined : countries[key];
}

export function getRegions(code«: string»)«: Region[]» {
  const country = getCountry(code);
  return country === undefined ? [] : country.regions;
}

export function getCities(code«: string», regionCode«?: string»)«: City[]» {
  const regions = getRegions(code);
  if (regionCode === undefined) {
    return regions.flatMap((region) => region.cities);
  }
  const region = regions.find((candidate) => candidate.code === regionCode);
  return region === undefined ? [] : region.cities;
}

export function getAllCities()«: City[]» {
  return codes.flatMap((code) => getCities(code));
}

export function getLocalizedName(
  entity«: { name?: LocalizedName } | null | undefined»,
  lang«: string»,
)«: string» {
  const name = entity?.name;
  if (name === undefined || name === null) {
    return "";
  }
  if (has(name, lang)) {
    return name[lang] ?? "";
  }
  if (has(name, "en")) {
    return name["en"] ?? "";
  }
  const first = Object.keys(name)[0];
  return first === undefined ? "" : name[first] ?? "";
}

export function getCountryCodes()«: CountryCode[]» {
  return [...codes];
}
"#;

/// Render the accessor module for `codes`.
///
/// Codes are sorted and deduplicated first, so the output depends only on
/// the set of codes and the mode.
///
/// # Examples
/// ```
/// use geoset_codegen::{OutputMode, render};
/// use geoset_core::CountryCode;
///
/// let codes = ["us", "sa"].map(|raw| CountryCode::parse(raw).expect("valid code"));
/// let module = render(&codes, OutputMode::TypeScript);
/// assert!(module.contains(r#"export type CountryCode = "SA" | "US";"#));
/// ```
#[must_use]
pub fn render(codes: &[CountryCode], mode: OutputMode) -> String {
    let unique: BTreeSet<&CountryCode> = codes.iter().collect();
    let mut module = String::from(HEADER);

    if !unique.is_empty() {
        module.push('\n');
    }
    for code in &unique {
        module.push_str(&import_line(code));
    }

    if mode.keeps_types() {
        module.push_str(TYPES);
        module.push_str(&format!("\nexport type CountryCode = {};\n", code_union(&unique)));
    }

    module.push('\n');
    module.push_str(&countries_table(&unique, mode));
    module.push('\n');
    module.push_str(&specialise(
        &format!(
            "const codes«: readonly CountryCode[]» = [{}];\n",
            quoted_codes(&unique).join(", ")
        ),
        mode,
    ));
    module.push_str(&specialise(HELPERS, mode));
    module
}

fn binding(code: &CountryCode) -> String {
    format!("data_{code}")
}

fn import_line(code: &CountryCode) -> String {
    format!(
        "import {} from \"./{}\" with {{ type: \"json\" }};\n",
        binding(code),
        code.file_name()
    )
}

fn quoted_codes(codes: &BTreeSet<&CountryCode>) -> Vec<String> {
    codes
        .iter()
        .map(|code| format!("\"{}\"", code.to_upper()))
        .collect()
}

fn code_union(codes: &BTreeSet<&CountryCode>) -> String {
    if codes.is_empty() {
        "never".to_owned()
    } else {
        quoted_codes(codes).join(" | ")
    }
}

fn countries_table(codes: &BTreeSet<&CountryCode>, mode: OutputMode) -> String {
    let declaration = specialise(
        "export const countries«: Record<CountryCode, Country>» = ",
        mode,
    );
    if codes.is_empty() {
        return format!("{declaration}{{}};\n");
    }
    let cast = specialise("« as Country»", mode);
    let entries: String = codes
        .iter()
        .map(|code| format!("  {}: {}{cast},\n", code.to_upper(), binding(code)))
        .collect();
    format!("{declaration}{{\n{entries}}};\n")
}

/// Keep or drop the `«…»` type fragments of `template` for `mode`.
pub(crate) fn specialise(template: &str, mode: OutputMode) -> String {
    let keep = mode.keeps_types();
    let mut out = String::with_capacity(template.len());
    let mut in_types = false;
    for ch in template.chars() {
        match ch {
            '«' => in_types = true,
            '»' => in_types = false,
            _ if in_types && !keep => {}
            _ => out.push(ch),
        }
    }
    out
}
