use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};

/// Genome builds that the CAGE auxiliary pipeline understands. Organism codes
/// resolving to one of these get the "_f5" suffix appended before submission.
const CAGE_BUILDS: [&str; 4] = ["hg19", "mm10", "hg38", "mm39"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Microarray,
    Rnaseq,
    Chipseq,
    Cage,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Microarray => write!(f, "microarray"),
            DataType::Rnaseq => write!(f, "rnaseq"),
            DataType::Chipseq => write!(f, "chipseq"),
            DataType::Cage => write!(f, "cage"),
        }
    }
}

/// Organism as accepted on the command line: either a common-name alias or a
/// concrete genome build. Note that fastq input is not supported server-side
/// for the hg18 and mm9 builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Organism {
    Human,
    Mouse,
    Rat,
    Zebrafish,
    Yeast,
    Ecoli,
    Arabidopsis,
    Hg18,
    Hg19,
    Hg38,
    Mm9,
    Mm10,
    Mm39,
    Rn6,
    #[value(name = "e_coli")]
    EColiBuild,
    #[value(name = "sacSer2")]
    SacSer2,
    #[value(name = "arTal")]
    ArTal,
    Dr11,
}

impl Organism {
    /// Resolves a common-name alias to its canonical genome build; concrete
    /// builds pass through unchanged.
    pub fn build(&self) -> &'static str {
        match self {
            Organism::Human | Organism::Hg38 => "hg38",
            Organism::Mouse | Organism::Mm39 => "mm39",
            Organism::Rat | Organism::Rn6 => "rn6",
            Organism::Zebrafish | Organism::Dr11 => "dr11",
            Organism::Yeast | Organism::SacSer2 => "sacSer2",
            Organism::Ecoli | Organism::EColiBuild => "e_coli",
            Organism::Arabidopsis | Organism::ArTal => "arTal",
            Organism::Hg18 => "hg18",
            Organism::Hg19 => "hg19",
            Organism::Mm9 => "mm9",
            Organism::Mm10 => "mm10",
        }
    }

    pub fn resolve(&self) -> OrganismCode {
        OrganismCode::from_build(self.build())
    }
}

/// Organism code as submitted to the server, with the "_f5" suffix already
/// applied for CAGE-compatible builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganismCode(String);

impl OrganismCode {
    pub fn from_build(build: &str) -> Self {
        if CAGE_BUILDS.contains(&build) {
            Self(format!("{build}_f5"))
        } else {
            Self(build.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrganismCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job-level parameters registered with the server ahead of the upload and
/// echoed (minus the size map) in the final run request. The serialized form
/// matches the payload the server stores under the session directory.
#[derive(Debug, Clone, Serialize)]
pub struct JobParameters {
    pub email: String,
    pub project: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub organism: OrganismCode,
    #[serde(serialize_with = "bool_as_str")]
    pub mirna: bool,
    pub files: BTreeMap<String, String>,
    submission: &'static str,
}

impl JobParameters {
    pub fn new(
        email: String,
        project: String,
        data_type: DataType,
        organism: OrganismCode,
        mirna: bool,
        files: BTreeMap<String, String>,
    ) -> Self {
        Self {
            email,
            project,
            data_type,
            organism,
            mirna,
            files,
            submission: "uploader",
        }
    }
}

fn bool_as_str<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "true" } else { "false" })
}

/// Server-assigned token naming the remote working directory for one
/// invocation. Acquired once, read-only afterwards, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session(String);

impl Session {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full link to the submission/results page, built from the server's
/// relative-path response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionLink(String);

impl SubmissionLink {
    pub fn new(url: String) -> Self {
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
