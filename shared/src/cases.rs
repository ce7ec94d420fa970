//! Case creation: the form, the record sent to the backend and the
//! create-then-upload save flow.

use std::collections::{BTreeMap, VecDeque};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::capabilities::{into_reply, ApiRequest, Capabilities, HttpReply, HttpResult};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult, ErrorKind};
use crate::event::Event;
use crate::model::Model;
use crate::multipart::MultipartForm;

pub const SAVE_ABORTED: &str = "Failed to save case details. Aborting image upload.";
pub const SAVE_SUCCEEDED: &str = "Case and images saved successfully!";
pub const SAVE_FAILED: &str = "An error occurred while saving the case.";

/// Crime-type suggestions offered next to the case title.
pub const CASE_CATEGORIES: [&str; 15] = [
    "Robbery in Downtown",
    "Fraud Investigation",
    "Missing Person Report",
    "Cybercrime Hacking",
    "Drug Trafficking Arrest",
    "Kidnapping Case",
    "Human Trafficking Incident",
    "Domestic Violence Report",
    "Terrorist Threat Investigation",
    "Money Laundering Case",
    "Vandalism and Property Damage",
    "Illegal Smuggling Case",
    "Arson Investigation",
    "Illegal Firearms Possession",
    "Bribery and Corruption",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CaseField {
    #[serde(rename = "suspectName")]
    SuspectName,
    #[serde(rename = "fatherName")]
    FatherName,
    #[serde(rename = "motherName")]
    MotherName,
    #[serde(rename = "suspectAge")]
    SuspectAge,
    #[serde(rename = "suspectGender")]
    SuspectGender,
    #[serde(rename = "suspectDOB")]
    SuspectDob,
    #[serde(rename = "AadhaarNumber")]
    AadhaarNumber,
    #[serde(rename = "PhoneNumber")]
    PhoneNumber,
    #[serde(rename = "modusOperandi")]
    ModusOperandi,
    #[serde(rename = "caseTitle")]
    CaseTitle,
    #[serde(rename = "BailDetails")]
    BailDetails,
    #[serde(rename = "Firnumber")]
    FirNumber,
    #[serde(rename = "caseDetails")]
    CaseDetails,
    #[serde(rename = "familyTies")]
    FamilyTies,
    #[serde(rename = "evidenceCollected")]
    EvidenceCollected,
    #[serde(rename = "crimeType")]
    CrimeType,
    #[serde(rename = "wantedLevel")]
    WantedLevel,
    #[serde(rename = "officerName")]
    OfficerName,
    #[serde(rename = "caseStatus")]
    CaseStatus,
}

impl CaseField {
    pub const ALL: [CaseField; 19] = [
        Self::SuspectName,
        Self::FatherName,
        Self::MotherName,
        Self::SuspectAge,
        Self::SuspectGender,
        Self::SuspectDob,
        Self::AadhaarNumber,
        Self::PhoneNumber,
        Self::ModusOperandi,
        Self::CaseTitle,
        Self::BailDetails,
        Self::FirNumber,
        Self::CaseDetails,
        Self::FamilyTies,
        Self::EvidenceCollected,
        Self::CrimeType,
        Self::WantedLevel,
        Self::OfficerName,
        Self::CaseStatus,
    ];

    /// Key in the creation payload.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::SuspectName => "suspectName",
            Self::FatherName => "fatherName",
            Self::MotherName => "motherName",
            Self::SuspectAge => "suspectAge",
            Self::SuspectGender => "suspectGender",
            Self::SuspectDob => "suspectDOB",
            Self::AadhaarNumber => "AadhaarNumber",
            Self::PhoneNumber => "PhoneNumber",
            Self::ModusOperandi => "modusOperandi",
            Self::CaseTitle => "caseTitle",
            Self::BailDetails => "BailDetails",
            Self::FirNumber => "Firnumber",
            Self::CaseDetails => "caseDetails",
            Self::FamilyTies => "familyTies",
            Self::EvidenceCollected => "evidenceCollected",
            Self::CrimeType => "crimeType",
            Self::WantedLevel => "wantedLevel",
            Self::OfficerName => "officerName",
            Self::CaseStatus => "caseStatus",
        }
    }

    /// Id of the form control holding the value.
    pub const fn element_id(self) -> &'static str {
        match self {
            Self::ModusOperandi => "modusoperandi",
            Self::FamilyTies => "family_ties",
            Self::EvidenceCollected => "evidence_collected",
            Self::WantedLevel => "wantedlevel",
            other => other.wire_name(),
        }
    }
}

/// Image slots, declared in upload order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ImageRole {
    #[serde(rename = "suspectPhoto")]
    SuspectPhoto,
    #[serde(rename = "evidencePhoto")]
    EvidencePhoto,
    #[serde(rename = "crimeScenePhoto")]
    CrimeScenePhoto,
}

impl ImageRole {
    pub const ALL: [ImageRole; 3] = [Self::SuspectPhoto, Self::EvidencePhoto, Self::CrimeScenePhoto];

    /// Value of the `image_type` upload field.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::SuspectPhoto => "suspectPhoto",
            Self::EvidencePhoto => "evidencePhoto",
            Self::CrimeScenePhoto => "crimeScenePhoto",
        }
    }

    /// Id of the file input; used in upload notices.
    pub const fn element_id(self) -> &'static str {
        match self {
            Self::SuspectPhoto => "suspectPhoto",
            Self::EvidencePhoto => "evidencePhoto",
            Self::CrimeScenePhoto => "crimescenePhoto",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub role: ImageRole,
    pub file_name: String,
    pub content_type: String,
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseForm {
    values: BTreeMap<CaseField, String>,
    images: BTreeMap<ImageRole, ImageAttachment>,
}

impl CaseForm {
    pub fn set(&mut self, field: CaseField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn value(&self, field: CaseField) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    /// Replaces any attachment already held for the same role.
    pub fn attach(&mut self, attachment: ImageAttachment) {
        self.images.insert(attachment.role, attachment);
    }

    pub fn detach(&mut self, role: ImageRole) -> Option<ImageAttachment> {
        self.images.remove(&role)
    }

    pub fn attachment(&self, role: ImageRole) -> Option<&ImageAttachment> {
        self.images.get(&role)
    }

    /// Attached images in upload order.
    pub fn attachments(&self) -> impl Iterator<Item = &ImageAttachment> {
        self.images.values()
    }

    pub fn record(&self) -> CaseRecord {
        CaseRecord {
            values: CaseField::ALL
                .iter()
                .map(|field| self.value(*field).to_string())
                .collect(),
        }
    }
}

/// The creation payload: every field, in a fixed order, empty when unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRecord {
    values: Vec<String>,
}

impl CaseRecord {
    pub fn get(&self, field: CaseField) -> &str {
        CaseField::ALL
            .iter()
            .position(|f| *f == field)
            .and_then(|i| self.values.get(i))
            .map_or("", String::as_str)
    }
}

impl Serialize for CaseRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CaseField::ALL.len()))?;
        for field in CaseField::ALL {
            map.serialize_entry(field.wire_name(), self.get(field))?;
        }
        map.end()
    }
}

/// Where a save stands. Attachments are captured when the save starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SavePhase {
    #[default]
    Idle,
    Creating {
        attachments: VecDeque<ImageAttachment>,
    },
    Uploading {
        case_id: String,
        current: ImageRole,
        remaining: VecDeque<ImageAttachment>,
        uploaded: Vec<ImageRole>,
    },
}

impl SavePhase {
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaseEvent {
    FieldChanged {
        field: CaseField,
        value: String,
    },
    ImageSelected {
        role: ImageRole,
        file_name: String,
        content_type: String,
        #[serde(with = "serde_bytes")]
        bytes: Vec<u8>,
    },
    ImageCleared {
        role: ImageRole,
    },
    SaveRequested,
    FormReset,

    #[serde(skip)]
    CaseCreated(Box<HttpResult>),
    #[serde(skip)]
    ImageUploaded {
        role: ImageRole,
        result: Box<HttpResult>,
    },
}

impl CaseEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FieldChanged { .. } => "case_field_changed",
            Self::ImageSelected { .. } => "case_image_selected",
            Self::ImageCleared { .. } => "case_image_cleared",
            Self::SaveRequested => "case_save_requested",
            Self::FormReset => "case_form_reset",
            Self::CaseCreated(_) => "case_created",
            Self::ImageUploaded { .. } => "case_image_uploaded",
        }
    }
}

/// Backend case ids arrive as strings or numbers.
pub fn parse_case_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn create_request(config: &AppConfig, record: &CaseRecord) -> AppResult<ApiRequest> {
    Ok(ApiRequest::post(config.endpoint(&config.create_case_path))?.with_json(record)?)
}

pub fn upload_request(
    config: &AppConfig,
    case_id: &str,
    attachment: &ImageAttachment,
) -> AppResult<ApiRequest> {
    let form = MultipartForm::new()
        .text("id", case_id)
        .file(
            "image",
            attachment.file_name.as_str(),
            attachment.content_type.as_str(),
            attachment.bytes.clone(),
        )
        .text("image_type", attachment.role.tag());
    let body = form.encode()?;

    Ok(ApiRequest::post(config.endpoint(&config.upload_path))?
        .with_body(form.content_type(), body)?)
}

fn created_case_id(response: &HttpReply) -> AppResult<String> {
    if !response.is_success() {
        return Err(AppError::from_http_status(response.status(), response.body()));
    }

    let body: Value = response.json()?;
    parse_case_id(body.get("case_id")).ok_or_else(|| {
        AppError::new(ErrorKind::InvalidResponse, "no case_id in creation reply")
            .with_internal(String::from_utf8_lossy(response.body()).into_owned())
    })
}

fn upload_failure_notice(role: ImageRole, response: &HttpReply) -> (AppError, String) {
    let err = AppError::from_http_status(response.status(), response.body());
    let notice = format!("Error uploading {}: {}", role.element_id(), err.message);
    (err, notice)
}

fn start_save(model: &mut Model, caps: &Capabilities) {
    if model.save.is_busy() {
        warn!("save already in progress, ignoring");
        return;
    }

    let record = model.case_form.record();
    let attachments: VecDeque<ImageAttachment> = model.case_form.attachments().cloned().collect();

    match create_request(&model.config, &record) {
        Ok(request) => {
            info!(
                title = record.get(CaseField::CaseTitle),
                images = attachments.len(),
                "saving case"
            );
            model.save = SavePhase::Creating { attachments };
            request.send(&caps.http, |result| {
                Event::Cases(CaseEvent::CaseCreated(Box::new(result)))
            });
        }
        Err(e) => {
            error!(error = %e, "cannot build case request");
            caps.notice.alert(SAVE_FAILED);
        }
    }
}

/// Sends the next attachment, or finishes the save when none are left.
fn upload_next(
    model: &mut Model,
    caps: &Capabilities,
    case_id: String,
    mut remaining: VecDeque<ImageAttachment>,
    uploaded: Vec<ImageRole>,
) {
    let Some(attachment) = remaining.pop_front() else {
        info!(case_id, images = uploaded.len(), "case saved");
        model.save = SavePhase::Idle;
        caps.notice.alert(SAVE_SUCCEEDED);
        return;
    };

    let role = attachment.role;
    match upload_request(&model.config, &case_id, &attachment) {
        Ok(request) => {
            debug!(case_id, role = role.tag(), "uploading image");
            model.save = SavePhase::Uploading {
                case_id,
                current: role,
                remaining,
                uploaded,
            };
            request.send(&caps.http, move |result| {
                Event::Cases(CaseEvent::ImageUploaded {
                    role,
                    result: Box::new(result),
                })
            });
        }
        Err(e) => {
            error!(error = %e, role = role.tag(), "cannot build upload request");
            model.save = SavePhase::Idle;
            caps.notice.alert(SAVE_FAILED);
        }
    }
}

pub fn update(event: CaseEvent, model: &mut Model, caps: &Capabilities) {
    match event {
        CaseEvent::FieldChanged { field, value } => {
            model.case_form.set(field, value);
            caps.render.render();
        }

        CaseEvent::ImageSelected {
            role,
            file_name,
            content_type,
            bytes,
        } => {
            debug!(role = role.tag(), size = bytes.len(), "image attached");
            model.case_form.attach(ImageAttachment {
                role,
                file_name,
                content_type,
                bytes,
            });
            caps.render.render();
        }

        CaseEvent::ImageCleared { role } => {
            model.case_form.detach(role);
            caps.render.render();
        }

        CaseEvent::FormReset => {
            model.case_form = CaseForm::default();
            caps.render.render();
        }

        CaseEvent::SaveRequested => {
            start_save(model, caps);
            caps.render.render();
        }

        CaseEvent::CaseCreated(result) => {
            let attachments = match std::mem::take(&mut model.save) {
                SavePhase::Creating { attachments } => attachments,
                other => {
                    warn!("creation reply without a pending save");
                    model.save = other;
                    return;
                }
            };

            let case_id = into_reply(*result)
                .map_err(AppError::from)
                .and_then(|reply| created_case_id(&reply));

            match case_id {
                Ok(case_id) => {
                    info!(case_id, "case record created");
                    upload_next(model, caps, case_id, attachments, Vec::new());
                }
                Err(e) => {
                    error!(error = %e, "failed to save case");
                    caps.notice.alert(SAVE_ABORTED);
                }
            }
            caps.render.render();
        }

        CaseEvent::ImageUploaded { role, result } => {
            let (case_id, remaining, mut uploaded) = match std::mem::take(&mut model.save) {
                SavePhase::Uploading {
                    case_id,
                    current,
                    remaining,
                    uploaded,
                } if current == role => (case_id, remaining, uploaded),
                other => {
                    warn!(role = role.tag(), "upload reply without a matching pending upload");
                    model.save = other;
                    return;
                }
            };

            match into_reply(*result) {
                Ok(response) if response.is_success() => {
                    info!(case_id, role = role.tag(), "image uploaded");
                    uploaded.push(role);
                    upload_next(model, caps, case_id, remaining, uploaded);
                }
                Ok(response) => {
                    let (err, notice) = upload_failure_notice(role, &response);
                    error!(error = %err, role = role.element_id(), "error uploading image");
                    caps.notice.alert(notice);
                }
                Err(e) => {
                    error!(error = %AppError::from(e), role = role.element_id(), "error uploading image");
                    caps.notice
                        .alert(format!("An error occurred while uploading {}", role.element_id()));
                }
            }
            caps.render.render();
        }
    }
}
