//! Core data types for the parser.
//!
//! These types represent Brazilian legal acts and their structural devices.
//! Serde renames give the Portuguese keys of the hand-off document consumed
//! by the loaders and linkers downstream.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::config::{validate_date, validate_urn};
use crate::error::Result;

/// Raw act as delivered by the text-acquisition collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAct {
    /// Act identifier (e.g., "br;go;aparecida.goiania;lei;2023-03-10;1234").
    pub urn: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_ato: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ementa: Option<String>,

    /// Signing date, YYYY-MM-DD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_legislacao: Option<String>,

    /// Publication date, YYYY-MM-DD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_publicacao: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orgao_publicador: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_fonte: Option<String>,

    /// Extracted text, already decoded.
    pub texto_bruto: String,
}

impl RawAct {
    /// Create an act with only an identifier and its text.
    #[must_use]
    pub fn new(urn: impl Into<String>, texto_bruto: impl Into<String>) -> Self {
        Self {
            urn: urn.into(),
            texto_bruto: texto_bruto.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tipo_ato(mut self, tipo_ato: impl Into<String>) -> Self {
        self.tipo_ato = Some(tipo_ato.into());
        self
    }

    #[must_use]
    pub fn with_data_publicacao(mut self, date: impl Into<String>) -> Self {
        self.data_publicacao = Some(date.into());
        self
    }

    #[must_use]
    pub fn with_data_legislacao(mut self, date: impl Into<String>) -> Self {
        self.data_legislacao = Some(date.into());
        self
    }

    /// Check the identifier and any dates present.
    pub fn validate(&self) -> Result<()> {
        validate_urn(&self.urn)?;
        for date in [&self.data_legislacao, &self.data_publicacao]
            .into_iter()
            .flatten()
        {
            validate_date(date)?;
        }
        Ok(())
    }

    /// Metadata echoed into the parse result.
    #[must_use]
    pub fn metadata(&self) -> ActMetadata {
        ActMetadata {
            urn: self.urn.clone(),
            tipo_ato: self.tipo_ato.clone(),
            titulo: self.titulo.clone(),
            ementa: self.ementa.clone(),
            data_legislacao: self.data_legislacao.clone(),
            data_publicacao: self.data_publicacao.clone(),
            orgao_publicador: self.orgao_publicador.clone(),
            url_fonte: self.url_fonte.clone(),
        }
    }
}

/// Act metadata without the text (`fonte` in the output document).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActMetadata {
    pub urn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_ato: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ementa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_legislacao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_publicacao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orgao_publicador: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_fonte: Option<String>,
}

/// Kinds of structural device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    #[serde(rename = "titulo")]
    Title,
    #[serde(rename = "livro")]
    Book,
    #[serde(rename = "parte")]
    Part,
    #[serde(rename = "capitulo")]
    Chapter,
    #[serde(rename = "secao")]
    Section,
    #[serde(rename = "subsecao")]
    Subsection,
    #[serde(rename = "artigo")]
    Article,
    #[serde(rename = "paragrafo")]
    Paragraph,
    #[serde(rename = "paragrafo_unico")]
    SoleParagraph,
    #[serde(rename = "inciso")]
    Inciso,
    #[serde(rename = "alinea")]
    Alinea,
    #[serde(rename = "item")]
    Item,
    /// Quoted new wording of an amended device.
    #[serde(rename = "alteracao")]
    Alteration,
    /// Preamble or whole-text pseudo-node.
    #[serde(rename = "auxiliar")]
    Auxiliary,
}

impl DeviceKind {
    /// Get the string value used in the output document.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "titulo",
            Self::Book => "livro",
            Self::Part => "parte",
            Self::Chapter => "capitulo",
            Self::Section => "secao",
            Self::Subsection => "subsecao",
            Self::Article => "artigo",
            Self::Paragraph => "paragrafo",
            Self::SoleParagraph => "paragrafo_unico",
            Self::Inciso => "inciso",
            Self::Alinea => "alinea",
            Self::Item => "item",
            Self::Alteration => "alteracao",
            Self::Auxiliary => "auxiliar",
        }
    }

    /// Prefix used when building structural paths.
    #[must_use]
    pub fn path_prefix(&self) -> &'static str {
        match self {
            Self::Title => "tit",
            Self::Book => "liv",
            Self::Part => "par",
            Self::Chapter => "cap",
            Self::Section => "sec",
            Self::Subsection => "subsec",
            Self::Article => "art",
            Self::Paragraph => "p",
            Self::SoleParagraph => "pu",
            Self::Inciso => "inc",
            Self::Alinea => "ali",
            Self::Item => "item",
            Self::Alteration => "alt",
            Self::Auxiliary => "aux",
        }
    }

    /// Grouping headings that carry a name but no normative text.
    #[must_use]
    pub fn is_heading(&self) -> bool {
        matches!(
            self,
            Self::Title
                | Self::Book
                | Self::Part
                | Self::Chapter
                | Self::Section
                | Self::Subsection
        )
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of cross-reference found in a device text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// "Redação dada pela Lei nº ..."
    Altera,
    /// "Revogado pela Lei nº ..."
    Revoga,
    /// "Regulamentado pelo Decreto nº ..."
    Regulamenta,
    /// "(Vide Lei nº ...)"
    Remete,
    /// Any other mention of a numbered act.
    Cita,
}

/// Unresolved cross-reference marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub tipo: RelationKind,

    /// Matched phrase, verbatim.
    pub trecho: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_ato: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ano: Option<String>,
}

/// Validity status of a text version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidityStatus {
    Vigente,
    /// The new wording only records that the device was revoked.
    Revogado,
}

/// What normalization did to a version's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationAudit {
    /// Names of the rules that changed the text, in application order.
    pub regras_aplicadas: Vec<String>,
    /// Characters removed by those rules.
    pub removido_total_chars: usize,
}

/// Alternate redaction of a device supplied by an amendment block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextVersion {
    pub texto_original: String,
    pub texto_normalizado: String,
    pub hash_texto_normalizado: String,
    #[serde(default)]
    pub normalizacao: NormalizationAudit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vigencia_inicio: Option<chrono::NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vigencia_fim: Option<chrono::NaiveDate>,
    pub status_vigencia: ValidityStatus,
}

/// A structural device of an act.
///
/// Each node exclusively owns its children; there are no parent pointers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceNode {
    /// Marker text as it appeared ("Art. 5º", "§ 1º", "II", "a)").
    #[serde(rename = "rotulo")]
    pub label: String,

    #[serde(rename = "tipo")]
    pub kind: DeviceKind,

    /// Own content, excluding any text belonging to children.
    #[serde(rename = "texto")]
    pub text: String,

    /// 1-based sibling index; 0 for pseudo-nodes.
    #[serde(rename = "ordem")]
    pub order: usize,

    #[serde(rename = "caminho_estrutural", default)]
    pub structural_path: String,

    #[serde(rename = "hash_texto", default)]
    pub content_hash: String,

    #[serde(rename = "filhos", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DeviceNode>,

    #[serde(rename = "relacoes", default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Relation>,

    #[serde(rename = "versoes", default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<TextVersion>,
}

impl DeviceNode {
    /// Create a node without children, path or hash.
    #[must_use]
    pub fn new(kind: DeviceKind, label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind,
            text: text.into(),
            order: 0,
            structural_path: String::new(),
            content_hash: String::new(),
            children: Vec::new(),
            relations: Vec::new(),
            versions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<DeviceNode>) -> Self {
        self.children = children;
        self
    }

    /// Depth-first, pre-order traversal of this node and its descendants.
    pub fn iter(&self) -> Devices<'_> {
        Devices { stack: vec![self] }
    }
}

/// Depth-first iterator over device nodes.
pub struct Devices<'a> {
    stack: Vec<&'a DeviceNode>,
}

impl<'a> Iterator for Devices<'a> {
    type Item = &'a DeviceNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Annex, table or schedule; never nested under a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnexNode {
    /// e.g. "ANEXO I", "TABELA ÚNICO".
    pub titulo: String,
    pub conteudo: String,
}

/// Date/place/signature block closing an act.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClosingClause {
    pub text: String,
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Recoverable conditions recorded during a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    /// A marker was classified as citation or as heading by the heuristics.
    AmbiguousMarkerResolved,
    /// A child-level marker without its expected parent level.
    OrphanChild,
    /// Two siblings would receive the same structural path.
    StructuralPathCollision,
    /// Amendment phrase without a parseable quoted block.
    UnresolvedAlteration,
    /// An annex marker opens the text.
    EmptyBody,
    /// The body has no structural marker at all.
    NoStructuralMarkers,
    /// A leading article numbered above 1 was folded into the preamble.
    LeadingArticleAsPreamble,
    /// The assisted collaborator was asked and could not answer.
    AssistUnavailable,
    /// The text is empty after normalization; the document has no tree.
    MalformedInput,
    /// The record's identifier or dates are invalid.
    InvalidMetadata,
}

impl DiagnosticCode {
    const ALL: [Self; 10] = [
        Self::AmbiguousMarkerResolved,
        Self::OrphanChild,
        Self::StructuralPathCollision,
        Self::UnresolvedAlteration,
        Self::EmptyBody,
        Self::NoStructuralMarkers,
        Self::LeadingArticleAsPreamble,
        Self::AssistUnavailable,
        Self::MalformedInput,
        Self::InvalidMetadata,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmbiguousMarkerResolved => "ambiguous_marker_resolved",
            Self::OrphanChild => "orphan_child",
            Self::StructuralPathCollision => "structural_path_collision",
            Self::UnresolvedAlteration => "unresolved_alteration",
            Self::EmptyBody => "empty_body",
            Self::NoStructuralMarkers => "no_structural_markers",
            Self::LeadingArticleAsPreamble => "leading_article_as_preamble",
            Self::AssistUnavailable => "assist_unavailable",
            Self::MalformedInput => "malformed_input",
            Self::InvalidMetadata => "invalid_metadata",
        }
    }
}

/// A non-fatal condition observed while parsing.
///
/// Serialised as a single string: `"warning[orphan_child]: message"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    /// A condition that left the document without a tree.
    #[must_use]
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {}",
            self.severity.as_str(),
            self.code.as_str(),
            self.message
        )
    }
}

impl FromStr for Diagnostic {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let malformed = || format!("malformed diagnostic: '{s}'");
        let (head, message) = s.split_once("]: ").ok_or_else(malformed)?;
        let (severity, code) = head.split_once('[').ok_or_else(malformed)?;
        let severity = match severity {
            "info" => Severity::Info,
            "warning" => Severity::Warning,
            "error" => Severity::Error,
            _ => return Err(malformed()),
        };
        let code = DiagnosticCode::ALL
            .into_iter()
            .find(|c| c.as_str() == code)
            .ok_or_else(malformed)?;
        Ok(Self {
            severity,
            code,
            message: message.to_string(),
        })
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Diagnostic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Root aggregate of one parse invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    #[serde(rename = "fonte")]
    pub source: ActMetadata,

    #[serde(rename = "dispositivos")]
    pub devices: Vec<DeviceNode>,

    #[serde(rename = "anexos", default)]
    pub annexes: Vec<AnnexNode>,

    #[serde(rename = "fecho", default, skip_serializing_if = "Option::is_none")]
    pub closing: Option<ClosingClause>,

    /// Overall confidence in `[0, 1]`.
    #[serde(rename = "confianca")]
    pub confidence: f64,

    #[serde(rename = "diagnosticos", default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Depth-first traversal over every device in the tree.
    pub fn iter_devices(&self) -> impl Iterator<Item = &DeviceNode> {
        self.devices.iter().flat_map(DeviceNode::iter)
    }

    /// Total number of devices, pseudo-nodes included.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.iter_devices().count()
    }

    /// Sorted, deduplicated content hashes of every device.
    #[must_use]
    pub fn hash_set(&self) -> Vec<String> {
        self.iter_devices()
            .map(|node| node.content_hash.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Look up a device by its structural path.
    #[must_use]
    pub fn find(&self, structural_path: &str) -> Option<&DeviceNode> {
        self.iter_devices()
            .find(|node| node.structural_path == structural_path)
    }

    /// Diagnostics with the given code.
    pub fn diagnostics_with(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }
}
