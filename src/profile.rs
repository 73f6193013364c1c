//! In-memory view of `~/.aws/credentials` and `~/.aws/config`.
//!
//! Both files are read positionally: the first section of each is the
//! default slot, whatever its name. A run loads the model once, rewrites the
//! default slot from the chosen profile and writes both files back.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::{
    aws::SessionCredentials,
    codec::{self, Document, Entry, Section},
    constants::{
        AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN, CONFIG_PROFILE_PREFIX,
        DEFAULT_PROFILE, ORIGINAL_AWS_ACCESS_KEY_ID, ORIGINAL_AWS_SECRET_ACCESS_KEY, OUTPUT,
        REGION,
    },
    error::{Error, Result},
};

const CREDENTIAL_KEYS: [&str; 5] = [
    AWS_ACCESS_KEY_ID,
    AWS_SECRET_ACCESS_KEY,
    AWS_SESSION_TOKEN,
    ORIGINAL_AWS_ACCESS_KEY_ID,
    ORIGINAL_AWS_SECRET_ACCESS_KEY,
];

const CONFIG_KEYS: [&str; 2] = [REGION, OUTPUT];

/// One section of the credentials file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub name: String,
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
    /// Long-lived keys kept beside a temporary session in the default slot
    pub original_access_key: Option<String>,
    pub original_secret_key: Option<String>,
    /// Entries this tool does not interpret, written back untouched
    pub extra: Vec<Entry>,
}

/// One section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub name: String,
    pub region: String,
    pub output: String,
    pub extra: Vec<Entry>,
}

/// Credentials and configs in file order; index 0 of each is the default slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    pub credentials: Vec<Credential>,
    pub configs: Vec<Config>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePaths {
    pub credentials: PathBuf,
    pub config: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
    paths: ProfilePaths,
}

fn extra_entries(section: &Section, known: &[&str]) -> Vec<Entry> {
    section
        .entries
        .iter()
        .filter(|entry| !known.contains(&entry.key.as_str()))
        .cloned()
        .collect()
}

impl Credential {
    /// `original_*` keys win over the plain ones: in a default slot written
    /// after a session exchange the plain keys are the temporary ones.
    fn from_section(section: &Section) -> Self {
        let original_access_key = section.get(ORIGINAL_AWS_ACCESS_KEY_ID);
        let original_secret_key = section.get(ORIGINAL_AWS_SECRET_ACCESS_KEY);
        let restored = original_access_key.is_some() || original_secret_key.is_some();

        Self {
            name: section.name.clone(),
            access_key: original_access_key
                .or_else(|| section.get(AWS_ACCESS_KEY_ID))
                .unwrap_or_default()
                .to_string(),
            secret_key: original_secret_key
                .or_else(|| section.get(AWS_SECRET_ACCESS_KEY))
                .unwrap_or_default()
                .to_string(),
            session_token: match restored {
                true => None,
                false => section.get(AWS_SESSION_TOKEN).map(str::to_string),
            },
            original_access_key: None,
            original_secret_key: None,
            extra: extra_entries(section, &CREDENTIAL_KEYS),
        }
    }

    fn to_section(&self) -> Section {
        let mut section = Section::new(&self.name);

        let keys = [
            (AWS_ACCESS_KEY_ID, Some(self.access_key.as_str())),
            (AWS_SECRET_ACCESS_KEY, Some(self.secret_key.as_str())),
            (AWS_SESSION_TOKEN, self.session_token.as_deref()),
            (ORIGINAL_AWS_ACCESS_KEY_ID, self.original_access_key.as_deref()),
            (ORIGINAL_AWS_SECRET_ACCESS_KEY, self.original_secret_key.as_deref()),
        ];
        // `key=` does not decode, so empty values are left out.
        for (key, value) in keys {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                section.push(key, value);
            }
        }

        section.entries.extend(self.extra.iter().cloned());
        section
    }
}

impl Config {
    fn from_section(section: &Section) -> Self {
        Self {
            name: section.name.clone(),
            region: section.get(REGION).unwrap_or_default().to_string(),
            output: section.get(OUTPUT).unwrap_or_default().to_string(),
            extra: extra_entries(section, &CONFIG_KEYS),
        }
    }

    fn to_section(&self) -> Section {
        let mut section = Section::new(&self.name);
        for (key, value) in [(REGION, &self.region), (OUTPUT, &self.output)] {
            if !value.is_empty() {
                section.push(key, value);
            }
        }
        section.entries.extend(self.extra.iter().cloned());
        section
    }
}

impl Model {
    /// Look up a credential by section name; `default` is always index 0.
    pub fn credential(&self, profile: &str) -> Result<&Credential> {
        let found = if profile == DEFAULT_PROFILE {
            self.credentials.first()
        } else {
            self.credentials.iter().rev().find(|c| c.name == profile)
        };
        found.ok_or_else(|| Error::NotFound(profile.to_string()))
    }

    /// Look up the `[profile <name>]` config, falling back to the default
    /// slot when the profile has no section of its own.
    pub fn config(&self, profile: &str) -> Result<&Config> {
        let section_name = format!("{CONFIG_PROFILE_PREFIX}{profile}");
        let found = if profile == DEFAULT_PROFILE {
            None
        } else {
            self.configs.iter().rev().find(|c| c.name == section_name)
        };

        found
            .or_else(|| self.configs.first())
            .ok_or_else(|| Error::NotFound(profile.to_string()))
    }

    /// Credential section names in file order.
    pub fn profile_names(&self) -> Vec<&str> {
        self.credentials.iter().map(|c| c.name.as_str()).collect()
    }

    /// Copy the keys, region and output of `profile` into the default slot.
    ///
    /// The slot keeps its section name; session tokens, original keys and
    /// unknown entries previously held there are discarded.
    pub fn select(&mut self, profile: &str) -> Result<()> {
        let credential = self.credential(profile)?;
        let (access_key, secret_key) =
            (credential.access_key.clone(), credential.secret_key.clone());
        let config = self.config(profile)?;
        let (region, output) = (config.region.clone(), config.output.clone());

        if let Some(slot) = self.credentials.first_mut() {
            *slot = Credential {
                name: std::mem::take(&mut slot.name),
                access_key,
                secret_key,
                ..Credential::default()
            };
        }
        if let Some(slot) = self.configs.first_mut() {
            *slot = Config {
                name: std::mem::take(&mut slot.name),
                region,
                output,
                extra: Vec::new(),
            };
        }

        debug!("Copied profile '{}' into the default slot", profile);
        Ok(())
    }

    /// Put temporary session credentials in the default slot, keeping the
    /// keys they replace as the original keys.
    pub fn apply_session(&mut self, session: &SessionCredentials) -> Result<()> {
        let slot = self
            .credentials
            .first_mut()
            .ok_or_else(|| Error::NotFound(DEFAULT_PROFILE.to_string()))?;
        let previous = std::mem::take(slot);

        *slot = Credential {
            name: previous.name,
            access_key: session.access_key_id.clone(),
            secret_key: session.secret_access_key.clone(),
            session_token: Some(session.session_token.clone()),
            original_access_key: Some(previous.access_key),
            original_secret_key: Some(previous.secret_key),
            extra: Vec::new(),
        };
        Ok(())
    }
}

impl ProfilePaths {
    pub fn new(credentials: impl Into<PathBuf>, config: impl Into<PathBuf>) -> Self {
        Self {
            credentials: credentials.into(),
            config: config.into(),
        }
    }
}

impl ProfileStore {
    pub fn new(paths: ProfilePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ProfilePaths {
        &self.paths
    }

    pub fn load(&self) -> Result<Model> {
        let configs = map_configs(&codec::decode_file(&self.paths.config)?)?;
        let credentials = map_credentials(&codec::decode_file(&self.paths.credentials)?)?;

        info!(
            credentials = credentials.len(),
            configs = configs.len(),
            "Loaded AWS profiles"
        );
        Ok(Model {
            credentials,
            configs,
        })
    }

    /// Write both files from `model`, config first.
    ///
    /// If the credentials write fails the config file has already been
    /// replaced; nothing is rolled back.
    pub fn set_default(&self, model: &Model) -> Result<()> {
        let configs = Document {
            sections: model.configs.iter().map(Config::to_section).collect(),
        };
        let credentials = Document {
            sections: model.credentials.iter().map(Credential::to_section).collect(),
        };

        codec::write_file(&self.paths.config, &configs)?;
        codec::write_file(&self.paths.credentials, &credentials)?;

        info!("Default profile written to {}", self.paths.credentials.display());
        Ok(())
    }
}

fn ensure_default_slot(document: &Document, what: &'static str) -> Result<()> {
    match document.sections.first() {
        None => Err(Error::Mapping {
            what,
            reason: "file has no sections, so there is no default slot".to_string(),
        }),
        Some(section) if section.name != DEFAULT_PROFILE => {
            warn!(
                "First {} section is [{}], not [{}]; using it as the default slot",
                what, section.name, DEFAULT_PROFILE
            );
            Ok(())
        }
        Some(_) => Ok(()),
    }
}

fn map_credentials(document: &Document) -> Result<Vec<Credential>> {
    ensure_default_slot(document, "credentials")?;
    Ok(document
        .sections
        .iter()
        .map(Credential::from_section)
        .collect())
}

fn map_configs(document: &Document) -> Result<Vec<Config>> {
    ensure_default_slot(document, "config")?;
    Ok(document.sections.iter().map(Config::from_section).collect())
}
