//! Action dispatch parsing for `POST /api/action`.
//!
//! The body is `{ "type": "...", "payload": {...} }`. The type is matched by
//! name first, then the payload is decoded into that action's input.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::content::{DealRequestInput, NewsletterInput, TestimonialInput, VoucherInput};
use crate::error::{Error, Result};
use crate::product::ProductInput;
use crate::resource::ResourceKind;
use crate::settings::SettingsSection;

/// Raw request body.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionEnvelope {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub payload: Value,
}

/// `deleteItem` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemInput {
    #[serde(alias = "item_type")]
    pub item_type: String,
    pub id: String,
}

/// A validated delete target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub kind: ResourceKind,
    pub id: String,
}

impl DeleteItemInput {
    pub fn into_target(self) -> Result<DeleteTarget> {
        let kind = ResourceKind::parse(&self.item_type)?;
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(Error::validation("id is required"));
        }
        Ok(DeleteTarget { kind, id })
    }
}

/// `saveSettings` payload: the appearance, banner and popup sections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default, alias = "site_appearance")]
    pub site_appearance: Option<Value>,
    #[serde(default, alias = "page_banners")]
    pub page_banners: Option<Value>,
    #[serde(default, alias = "popup_modal")]
    pub popup_modal: Option<Value>,
}

impl SettingsUpdate {
    /// Sections present in the payload, in column order.
    pub fn into_sections(self) -> Result<Vec<(SettingsSection, Value)>> {
        let sections: Vec<_> = [
            (SettingsSection::SiteAppearance, self.site_appearance),
            (SettingsSection::PageBanners, self.page_banners),
            (SettingsSection::PopupModal, self.popup_modal),
        ]
        .into_iter()
        .filter_map(|(section, value)| value.map(|v| (section, v)))
        .collect();

        if sections.is_empty() {
            return Err(Error::validation(
                "saveSettings requires siteAppearance, pageBanners or popupModal",
            ));
        }
        Ok(sections)
    }
}

/// A dispatched action.
#[derive(Debug, Clone)]
pub enum Action {
    SaveProduct(ProductInput),
    SaveSettings(SettingsUpdate),
    SaveTestimonial(TestimonialInput),
    DeleteItem(DeleteItemInput),
    SubmitVoucher(VoucherInput),
    SubmitDealRequest(DealRequestInput),
    SubscribeToNewsletter(NewsletterInput),
}

impl Action {
    /// Route an envelope by its `type`.
    pub fn parse(envelope: ActionEnvelope) -> Result<Self> {
        let ActionEnvelope {
            action_type,
            payload,
        } = envelope;

        let action = match action_type.as_str() {
            "saveProduct" => Self::SaveProduct(decode_payload(&action_type, payload)?),
            "saveSettings" => Self::SaveSettings(decode_payload(&action_type, payload)?),
            "saveTestimonial" => Self::SaveTestimonial(decode_payload(&action_type, payload)?),
            "deleteItem" => Self::DeleteItem(decode_payload(&action_type, payload)?),
            "submitVoucher" => Self::SubmitVoucher(decode_payload(&action_type, payload)?),
            "submitDealRequest" => {
                Self::SubmitDealRequest(decode_payload(&action_type, payload)?)
            }
            "subscribeToNewsletter" => {
                Self::SubscribeToNewsletter(decode_payload(&action_type, payload)?)
            }
            other => {
                return Err(Error::unknown_type(format!("Unknown action type: {}", other)));
            }
        };
        Ok(action)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SaveProduct(_) => "saveProduct",
            Self::SaveSettings(_) => "saveSettings",
            Self::SaveTestimonial(_) => "saveTestimonial",
            Self::DeleteItem(_) => "deleteItem",
            Self::SubmitVoucher(_) => "submitVoucher",
            Self::SubmitDealRequest(_) => "submitDealRequest",
            Self::SubscribeToNewsletter(_) => "subscribeToNewsletter",
        }
    }

    /// Whether the action is restricted to admins.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::SaveProduct(_) | Self::SaveSettings(_) | Self::SaveTestimonial(_) | Self::DeleteItem(_)
        )
    }
}

fn decode_payload<T: DeserializeOwned>(action_type: &str, payload: Value) -> Result<T> {
    let payload = if payload.is_null() {
        Value::Object(Default::default())
    } else {
        payload
    };
    serde_json::from_value(payload)
        .map_err(|e| Error::validation(format!("invalid {} payload: {}", action_type, e)))
}
