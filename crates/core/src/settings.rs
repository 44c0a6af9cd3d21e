//! Site settings: the singleton `main_settings` row.
//!
//! Each JSON column has a fixed schema. Writes are validated against it
//! (unknown keys rejected), reads decode the whole row into a [`SiteSettings`]
//! snapshot. A section that cannot be decoded falls back to its defaults as a
//! whole; it is never partially applied.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Primary key of the singleton settings row.
pub const SETTINGS_ROW_ID: &str = "main_settings";

/// Schema version written with every save.
///
/// - 0: legacy rows (snake_case keys, free-form)
/// - 1: camelCase keys, closed schema per section
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Settings columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingsSection {
    #[serde(alias = "site_appearance")]
    SiteAppearance,
    #[serde(alias = "page_banners")]
    PageBanners,
    #[serde(alias = "popup_modal")]
    PopupModal,
    #[serde(alias = "currency_rates")]
    CurrencyRates,
    #[serde(alias = "gamification_points")]
    GamificationPoints,
}

impl SettingsSection {
    pub const ALL: [SettingsSection; 5] = [
        Self::SiteAppearance,
        Self::PageBanners,
        Self::PopupModal,
        Self::CurrencyRates,
        Self::GamificationPoints,
    ];

    /// Column name in the `settings` table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::SiteAppearance => "site_appearance",
            Self::PageBanners => "page_banners",
            Self::PopupModal => "popup_modal",
            Self::CurrencyRates => "currency_rates",
            Self::GamificationPoints => "gamification_points",
        }
    }

    /// Parse a section name (camelCase or column name).
    pub fn parse(name: &str) -> Result<Self> {
        serde_json::from_value(Value::String(name.to_string()))
            .map_err(|_| Error::unknown_type(format!("Unknown settings section: {}", name)))
    }
}

/// Branding and homepage appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SiteAppearance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_dark_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialist_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<String>,
}

/// Banner shown at the top of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PageBanner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
}

/// Banners keyed by page slug (`home`, `vps`, `vpn`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageBanners(pub BTreeMap<String, PageBanner>);

/// Site-wide promotional popup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PopupModal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_once: Option<bool>,
}

/// Display currency conversion rates relative to `base`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CurrencyRates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rates: BTreeMap<String, Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Points awarded per gamification reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GamificationPoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_login: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_deal: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_deal: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_voucher: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_deal_request: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newsletter_signup: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_testimonial: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_mining_task: Option<i64>,
}

impl GamificationPoints {
    /// Configured points for a reason (camelCase or snake_case name).
    pub fn points_for(&self, reason: &str) -> Option<i64> {
        match reason {
            "dailyLogin" | "daily_login" => self.daily_login,
            "clickDeal" | "click_deal" => self.click_deal,
            "shareDeal" | "share_deal" => self.share_deal,
            "submitVoucher" | "submit_voucher" => self.submit_voucher,
            "submitDealRequest" | "submit_deal_request" => self.submit_deal_request,
            "newsletterSignup" | "newsletter_signup" => self.newsletter_signup,
            "writeTestimonial" | "write_testimonial" => self.write_testimonial,
            "completeMiningTask" | "complete_mining_task" => self.complete_mining_task,
            _ => None,
        }
    }
}

/// Decoded settings snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub schema_version: i64,
    pub site_appearance: SiteAppearance,
    pub page_banners: PageBanners,
    pub popup_modal: PopupModal,
    pub currency_rates: CurrencyRates,
    pub gamification_points: GamificationPoints,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            site_appearance: SiteAppearance::default(),
            page_banners: PageBanners::default(),
            popup_modal: PopupModal::default(),
            currency_rates: CurrencyRates::default(),
            gamification_points: GamificationPoints::default(),
        }
    }
}

/// Settings row as stored: one text column per section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSettings {
    pub schema_version: i64,
    pub columns: BTreeMap<SettingsSection, String>,
}

/// A validated section ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionWrite {
    pub section: SettingsSection,
    /// Canonical JSON text for the column.
    pub json: String,
}

impl SiteSettings {
    /// Decode a stored row.
    ///
    /// Returns the snapshot plus one warning per section that was migrated
    /// lossily or replaced with defaults.
    pub fn from_raw(raw: &RawSettings) -> (Self, Vec<String>) {
        let mut settings = SiteSettings::default();
        let mut warnings = Vec::new();

        for section in SettingsSection::ALL {
            let Some(text) = raw.columns.get(&section) else {
                continue;
            };

            let value = match decode_column(text) {
                Ok(Some(value)) => value,
                Ok(None) => continue,
                Err(e) => {
                    warnings.push(format!("{}: {}; using defaults", section.column(), e));
                    continue;
                }
            };

            let value = if raw.schema_version < CURRENT_SCHEMA_VERSION {
                let (migrated, dropped) = migrate_v0(section, value);
                if !dropped.is_empty() {
                    warnings.push(format!(
                        "{}: dropped legacy keys [{}]",
                        section.column(),
                        dropped.join(", ")
                    ));
                }
                migrated
            } else {
                value
            };

            if let Err(e) = settings.apply(section, value) {
                warnings.push(format!("{}: {}; using defaults", section.column(), e));
            }
        }

        (settings, warnings)
    }

    /// Replace one section from a JSON value, validating against its schema.
    pub fn apply(&mut self, section: SettingsSection, value: Value) -> Result<()> {
        match section {
            SettingsSection::SiteAppearance => self.site_appearance = decode_strict(value)?,
            SettingsSection::PageBanners => self.page_banners = decode_page_banners(value)?,
            SettingsSection::PopupModal => self.popup_modal = decode_strict(value)?,
            SettingsSection::CurrencyRates => self.currency_rates = decode_currency_rates(value)?,
            SettingsSection::GamificationPoints => {
                self.gamification_points = decode_strict(value)?
            }
        }
        Ok(())
    }

    /// JSON value of one section.
    pub fn section_value(&self, section: SettingsSection) -> Value {
        let value = match section {
            SettingsSection::SiteAppearance => serde_json::to_value(&self.site_appearance),
            SettingsSection::PageBanners => serde_json::to_value(&self.page_banners),
            SettingsSection::PopupModal => serde_json::to_value(&self.popup_modal),
            SettingsSection::CurrencyRates => serde_json::to_value(&self.currency_rates),
            SettingsSection::GamificationPoints => {
                serde_json::to_value(&self.gamification_points)
            }
        };
        value.unwrap_or(Value::Object(Map::new()))
    }
}

/// Validate a section payload and produce its canonical column text.
pub fn prepare_section(section: SettingsSection, value: Value) -> Result<SectionWrite> {
    if let Some(path) = find_null_member(&value, "") {
        return Err(Error::validation(format!(
            "{}: {} is null; omit the key to leave it unset",
            section.column(),
            path
        )));
    }
    let mut scratch = SiteSettings::default();
    scratch
        .apply(section, value)
        .map_err(|e| Error::validation(format!("{}: {}", section.column(), e)))?;
    let json = serde_json::to_string(&scratch.section_value(section))?;
    Ok(SectionWrite { section, json })
}

/// Dotted path of the first `null` object member, if any.
///
/// Unset fields are omitted when a section is stored, so an explicit `null`
/// would not read back as written.
fn find_null_member(value: &Value, prefix: &str) -> Option<String> {
    let Value::Object(map) = value else {
        return None;
    };
    map.iter().find_map(|(key, val)| {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Null => Some(path),
            nested => find_null_member(nested, &path),
        }
    })
}

/// Decode a column's text.
///
/// Some writers stored the section as a JSON string holding JSON; those are
/// decoded a second time. Empty text and `null` mean "unset".
pub fn decode_column(text: &str) -> Result<Option<Value>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(trimmed)? {
        Value::Null => Ok(None),
        Value::String(inner) => decode_column(&inner),
        value => Ok(Some(value)),
    }
}

fn decode_strict<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::validation(e.to_string()))
}

fn decode_page_banners(value: Value) -> Result<PageBanners> {
    let banners: PageBanners = decode_strict(value)?;
    for page in banners.0.keys() {
        let valid = !page.is_empty()
            && page
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::validation(format!("invalid page key: {:?}", page)));
        }
    }
    Ok(banners)
}

fn decode_currency_rates(value: Value) -> Result<CurrencyRates> {
    let rates: CurrencyRates = decode_strict(value)?;
    for (code, rate) in &rates.rates {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::validation(format!("invalid currency code: {}", code)));
        }
        if rate.as_f64().map_or(true, |r| r <= 0.0 || !r.is_finite()) {
            return Err(Error::validation(format!("rate for {} must be positive", code)));
        }
    }
    Ok(rates)
}

/// Legacy key renames, per section.
fn legacy_key(section: SettingsSection, key: &str) -> Option<&'static str> {
    let known: &[(&str, &str)] = match section {
        SettingsSection::SiteAppearance => &[
            ("site_name", "siteName"),
            ("siteName", "siteName"),
            ("tagline", "tagline"),
            ("logo", "logoUrl"),
            ("logo_url", "logoUrl"),
            ("logoUrl", "logoUrl"),
            ("logo_dark", "logoDarkUrl"),
            ("logo_dark_url", "logoDarkUrl"),
            ("logoDarkUrl", "logoDarkUrl"),
            ("favicon", "faviconUrl"),
            ("favicon_url", "faviconUrl"),
            ("faviconUrl", "faviconUrl"),
            ("specialist_image", "specialistImageUrl"),
            ("specialist_image_url", "specialistImageUrl"),
            ("specialistImageUrl", "specialistImageUrl"),
            ("primary_color", "primaryColor"),
            ("primaryColor", "primaryColor"),
            ("secondary_color", "secondaryColor"),
            ("secondaryColor", "secondaryColor"),
            ("accent_color", "accentColor"),
            ("accentColor", "accentColor"),
            ("font_family", "fontFamily"),
            ("fontFamily", "fontFamily"),
            ("hero_title", "heroTitle"),
            ("heroTitle", "heroTitle"),
            ("hero_subtitle", "heroSubtitle"),
            ("heroSubtitle", "heroSubtitle"),
            ("hero_image", "heroImageUrl"),
            ("hero_image_url", "heroImageUrl"),
            ("heroImageUrl", "heroImageUrl"),
            ("footer_text", "footerText"),
            ("footerText", "footerText"),
        ],
        SettingsSection::PopupModal => &[
            ("enabled", "enabled"),
            ("title", "title"),
            ("message", "message"),
            ("image", "imageUrl"),
            ("image_url", "imageUrl"),
            ("imageUrl", "imageUrl"),
            ("cta_text", "ctaText"),
            ("ctaText", "ctaText"),
            ("button_text", "ctaText"),
            ("cta_url", "ctaUrl"),
            ("ctaUrl", "ctaUrl"),
            ("button_url", "ctaUrl"),
            ("delay", "delaySeconds"),
            ("delay_seconds", "delaySeconds"),
            ("delaySeconds", "delaySeconds"),
            ("show_once", "showOnce"),
            ("showOnce", "showOnce"),
        ],
        SettingsSection::CurrencyRates => &[
            ("base", "base"),
            ("rates", "rates"),
            ("updated_at", "updatedAt"),
            ("updatedAt", "updatedAt"),
        ],
        SettingsSection::GamificationPoints => &[
            ("daily_login", "dailyLogin"),
            ("dailyLogin", "dailyLogin"),
            ("click_deal", "clickDeal"),
            ("clickDeal", "clickDeal"),
            ("share_deal", "shareDeal"),
            ("shareDeal", "shareDeal"),
            ("submit_voucher", "submitVoucher"),
            ("submitVoucher", "submitVoucher"),
            ("submit_deal_request", "submitDealRequest"),
            ("submitDealRequest", "submitDealRequest"),
            ("newsletter_signup", "newsletterSignup"),
            ("newsletterSignup", "newsletterSignup"),
            ("write_testimonial", "writeTestimonial"),
            ("writeTestimonial", "writeTestimonial"),
            ("complete_mining_task", "completeMiningTask"),
            ("completeMiningTask", "completeMiningTask"),
        ],
        SettingsSection::PageBanners => &[],
    };
    known.iter().find(|(from, _)| *from == key).map(|(_, to)| *to)
}

/// Migrate a schema-0 section to schema 1.
///
/// Known legacy keys are renamed, everything else is dropped and reported.
fn migrate_v0(section: SettingsSection, value: Value) -> (Value, Vec<String>) {
    let Value::Object(map) = value else {
        return (value, Vec::new());
    };

    let mut dropped = Vec::new();
    let mut out = Map::new();

    for (key, val) in map {
        if section == SettingsSection::PageBanners {
            let (banner, banner_dropped) = migrate_banner(val);
            dropped.extend(banner_dropped.into_iter().map(|k| format!("{}.{}", key, k)));
            out.insert(key, banner);
            continue;
        }

        match legacy_key(section, &key) {
            Some(new_key) if !val.is_null() => {
                out.insert(new_key.to_string(), val);
            }
            Some(_) => {}
            None => dropped.push(key),
        }
    }

    (Value::Object(out), dropped)
}

fn migrate_banner(value: Value) -> (Value, Vec<String>) {
    // Oldest rows stored a bare image URL per page.
    let map = match value {
        Value::String(url) => {
            let mut map = Map::new();
            map.insert("imageUrl".into(), Value::String(url));
            return (Value::Object(map), Vec::new());
        }
        Value::Object(map) => map,
        other => return (other, Vec::new()),
    };

    let mut dropped = Vec::new();
    let mut out = Map::new();
    for (key, val) in map {
        let new_key = match key.as_str() {
            "enabled" => "enabled",
            "image" | "image_url" | "imageUrl" => "imageUrl",
            "title" => "title",
            "subtitle" => "subtitle",
            "link" | "link_url" | "linkUrl" => "linkUrl",
            _ => {
                dropped.push(key);
                continue;
            }
        };
        if !val.is_null() {
            out.insert(new_key.to_string(), val);
        }
    }
    (Value::Object(out), dropped)
}
