//! Organization records served under `/v1/organizations`

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Resource;
use crate::handlers::query::{read_csv, ListQuery};
use crate::repository::{Entity, FieldValue, Filters, ListFilter, Record, Repository};
use crate::state::Models;
use crate::validator::{
    check_entries, check_required_text, matches, Validator, EMAIL_RX, PHONE_RX, WEBSITE_RX,
};

/// An organization and how to reach it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct Organization {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub record: Record,
    pub name: String,
    pub level: String,
    pub contact: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
    /// Delivery modes, e.g. `"online"` or `"face-to-face"`
    pub mode: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationFilter {
    pub name: String,
    pub level: String,
    pub mode: Vec<String>,
}

impl ListFilter for OrganizationFilter {
    fn text_terms(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_str()), ("level", self.level.as_str())]
    }

    fn tags(&self) -> &[String] {
        &self.mode
    }
}

impl Entity for Organization {
    type Filter = OrganizationFilter;

    const KIND: &'static str = "organization";
    const TABLE: &'static str = "organizations";
    const COLUMNS: &'static [&'static str] = &[
        "name", "level", "contact", "phone", "email", "website", "address", "mode",
    ];
    const TAGS_COLUMN: &'static str = "mode";
    const SORT_SAFELIST: &'static [&'static str] = &["id", "name", "level", "-id", "-name", "-level"];

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn validate(&self, v: &mut Validator) {
        check_required_text(v, &self.name, "name", 200);
        check_required_text(v, &self.level, "level", 200);
        check_required_text(v, &self.contact, "contact", 200);

        v.check(!self.phone.is_empty(), "phone", "must be provided");
        v.check(matches(&self.phone, &PHONE_RX), "phone", "must be a valid phone number");

        v.check(!self.email.is_empty(), "email", "must be provided");
        v.check(matches(&self.email, &EMAIL_RX), "email", "must be a valid email address");

        v.check(!self.website.is_empty(), "website", "must be provided");
        v.check(matches(&self.website, &WEBSITE_RX), "website", "must be a valid URL");

        check_required_text(v, &self.address, "address", 500);
        check_entries(v, &self.mode, "mode");
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("name", FieldValue::Text(self.name.clone())),
            ("level", FieldValue::Text(self.level.clone())),
            ("contact", FieldValue::Text(self.contact.clone())),
            ("phone", FieldValue::Text(self.phone.clone())),
            ("email", FieldValue::Text(self.email.clone())),
            ("website", FieldValue::Text(self.website.clone())),
            ("address", FieldValue::Text(self.address.clone())),
            ("mode", FieldValue::List(self.mode.clone())),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateOrganization {
    pub name: String,
    pub level: String,
    pub contact: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
    pub mode: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrganization {
    pub name: Option<String>,
    pub level: Option<String>,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub mode: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationQuery {
    pub name: Option<String>,
    pub level: Option<String>,
    /// Comma-separated modes
    pub mode: Option<String>,
    #[serde(flatten)]
    pub list: ListQuery,
}

impl Resource for Organization {
    type Create = CreateOrganization;
    type Patch = UpdateOrganization;
    type Query = OrganizationQuery;

    const ITEM_KEY: &'static str = "organization";
    const LIST_KEY: &'static str = "organizations";
    const COLLECTION_PATH: &'static str = "/v1/organizations";
    const DELETED_MESSAGE: &'static str = "organization successfully deleted";

    fn from_create(input: CreateOrganization) -> Self {
        Self {
            record: Record::default(),
            name: input.name,
            level: input.level,
            contact: input.contact,
            phone: input.phone,
            email: input.email,
            website: input.website,
            address: input.address,
            mode: input.mode,
        }
    }

    fn apply_patch(&mut self, patch: UpdateOrganization) {
        let UpdateOrganization {
            name,
            level,
            contact,
            phone,
            email,
            website,
            address,
            mode,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(level) = level {
            self.level = level;
        }
        if let Some(contact) = contact {
            self.contact = contact;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(website) = website {
            self.website = website;
        }
        if let Some(address) = address {
            self.address = address;
        }
        if let Some(mode) = mode {
            self.mode = mode;
        }
    }

    fn list_params(query: &OrganizationQuery, v: &mut Validator) -> (OrganizationFilter, Filters) {
        let filter = OrganizationFilter {
            name: query.name.clone().unwrap_or_default(),
            level: query.level.clone().unwrap_or_default(),
            mode: read_csv(query.mode.as_deref()),
        };
        (filter, query.list.filters(Self::SORT_SAFELIST, v))
    }

    fn repository(models: &Models) -> Arc<dyn Repository<Self>> {
        Arc::clone(&models.organizations)
    }
}
