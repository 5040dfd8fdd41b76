use super::Zone;
use serde::Serialize;

/// One syntactic route statement. `pattern` is always normalized.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDeclaration {
    pub pattern: String,
    pub component: Option<String>,
    pub file: String,
    pub line: usize,
    pub zone: Zone,
    /// Name of the extraction rule that produced it.
    pub rule: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    Anchor,
    LinkComponent,
    NavigationCall,
}

/// A navigational target written as a literal in a frontend file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReference {
    /// The literal exactly as written.
    pub target: String,
    pub file: String,
    pub line: usize,
    pub kind: LinkKind,
    /// Zone of the originating file.
    pub zone: Zone,
    pub rule: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    Public,
    Protected,
    Admin,
    Unknown,
}

impl AccessKind {
    #[must_use]
    pub fn from_builder(builder: &str) -> Self {
        match builder {
            "publicProcedure" => Self::Public,
            "protectedProcedure" => Self::Protected,
            "adminProcedure" => Self::Admin,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Admin => "admin",
            Self::Unknown => "unknown",
        }
    }
}

/// A procedure declared on the backend router tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcProcedure {
    pub namespace: String,
    pub name: String,
    pub access: AccessKind,
    pub file: String,
    pub line: usize,
}

impl RpcProcedure {
    #[must_use]
    pub fn key(&self) -> (&str, &str) {
        (&self.namespace, &self.name)
    }

    #[must_use]
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcMethodKind {
    Query,
    Mutation,
    Subscription,
    /// Cache helpers such as `invalidate` or `setData`.
    Utility,
}

impl RpcMethodKind {
    #[must_use]
    pub fn from_method(method: &str) -> Self {
        match method {
            "useMutation" | "mutate" | "mutateAsync" => Self::Mutation,
            "useSubscription" => Self::Subscription,
            "invalidate" | "refetch" | "setData" | "cancel" => Self::Utility,
            _ => Self::Query,
        }
    }
}

/// A frontend call-site of a remote procedure.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcUsage {
    pub namespace: String,
    pub name: String,
    /// Method as written, e.g. `useQuery`.
    pub method: String,
    pub kind: RpcMethodKind,
    pub file: String,
    pub line: usize,
}

impl RpcUsage {
    #[must_use]
    pub fn key(&self) -> (&str, &str) {
        (&self.namespace, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaTable {
    pub variable: String,
    pub table: String,
    pub file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HitKind {
    HardcodedSecret,
    OpenRedirect,
    AuthBypassLink,
    HardcodedLocalhost,
    HardcodedApiUrl,
    TodoMarker,
    ExcessDebugLog,
}

/// A raw lexical finding that maps straight to an issue.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternHit {
    pub kind: HitKind,
    pub file: String,
    /// 0 for whole-file findings.
    pub line: usize,
    /// Matched text, already masked where it carries a secret.
    pub snippet: String,
}

/// Everything extracted from one run, deduplicated and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactSet {
    pub routes: Vec<RouteDeclaration>,
    pub links: Vec<LinkReference>,
    pub procedures: Vec<RpcProcedure>,
    pub usages: Vec<RpcUsage>,
    pub tables: Vec<SchemaTable>,
    pub hits: Vec<PatternHit>,
}
