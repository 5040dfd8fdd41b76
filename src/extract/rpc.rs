//! tRPC procedure declarations (backend) and call-sites (frontend).

use super::LineIndex;
use crate::types::{AccessKind, RpcMethodKind, RpcProcedure, RpcUsage, SourceFile};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Namespace of procedures declared directly on the root router.
pub const ROOT_NAMESPACE: &str = "";

const INVOKE: &str = "useQuery|useMutation|useSubscription|useSuspenseQuery|useInfiniteQuery|mutateAsync|mutate|query";
const CACHE: &str = "invalidate|refetch|setData|cancel";

const ROUTER_CALL: &str = r"(?:t\.)?(?:router|createRouter|createTRPCRouter)\s*\(\s*\{";
const ROOT_ROUTERS: &[&str] = &["appRouter", "rootRouter", "router", "createRouter", "t"];
const SKIP_PROCEDURES: &[&str] = &["router", "createRouter", "t", "procedure"];

/// `(rule name, regex)`; `ns` may be absent for root-level calls.
static USAGE_RULES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    let ident = r"[A-Za-z_]\w*";
    [
        ("trpc-call", format!(r"\btrpc\.(?P<ns>{ident})\.(?P<name>{ident})\.(?P<method>{INVOKE})\b")),
        ("trpc-cache", format!(r"\btrpc\.(?P<ns>{ident})\.(?P<name>{ident})\.(?P<method>{CACHE})\b")),
        ("utils-cache", format!(r"\butils\.(?P<ns>{ident})\.(?P<name>{ident})\.(?P<method>{CACHE}|fetch|prefetch)\b")),
        ("trpc-root-call", format!(r"\btrpc\.(?P<name>{ident})\.(?P<method>{INVOKE})\b")),
    ]
    .into_iter()
    .filter_map(|(name, pattern)| compile(name, &pattern).map(|re| (name, re)))
    .collect()
});

static MEMBER_ROUTER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile("member-router", &format!(r"\b(?P<ns>[A-Za-z_]\w*)\s*:\s*{ROUTER_CALL}"))
});
static CONST_ROUTER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(
        "const-router",
        &format!(r"\b(?:const|let|var)\s+(?P<var>[A-Za-z_]\w*)\s*(?::\s*[\w.<>]+\s*)?=\s*{ROUTER_CALL}"),
    )
});
static PROCEDURE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(
        "procedure",
        r"\b(?P<name>[A-Za-z_]\w*)\s*:\s*(?:t\.)?(?P<builder>publicProcedure|protectedProcedure|adminProcedure|procedure)\b",
    )
});
static MOUNT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(
        "router-mount",
        r"(?m)\b(?P<ns>[A-Za-z_]\w*)\s*:\s*(?P<var>[A-Za-z_]\w*Router)\s*(?:[,}]|$)",
    )
});

fn compile(name: &str, pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .map_err(|e| tracing::warn!(rule = name, error = %e, "dropping extraction rule"))
        .ok()
}

/// Maps router variables to the namespace they are mounted under (`billing: billingRouter`).
pub fn collect_mounts<'a, I>(files: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a SourceFile>,
{
    let mut mounts = BTreeMap::new();
    let Some(re) = MOUNT.as_ref() else {
        return mounts;
    };
    for file in files {
        for caps in re.captures_iter(&file.text) {
            if let (Some(ns), Some(var)) = (caps.name("ns"), caps.name("var")) {
                mounts
                    .entry(var.as_str().to_string())
                    .or_insert_with(|| ns.as_str().to_string());
            }
        }
    }
    mounts
}

#[must_use]
pub fn extract_usages(file: &SourceFile) -> Vec<RpcUsage> {
    let lines = LineIndex::new(&file.text);
    let mut out = Vec::new();
    for (_, re) in USAGE_RULES.iter() {
        for caps in re.captures_iter(&file.text) {
            let (Some(name), Some(method)) = (caps.name("name"), caps.name("method")) else {
                continue;
            };
            let namespace = caps.name("ns").map_or(ROOT_NAMESPACE, |m| m.as_str());
            out.push(RpcUsage {
                namespace: namespace.to_string(),
                name: name.as_str().to_string(),
                method: method.as_str().to_string(),
                kind: RpcMethodKind::from_method(method.as_str()),
                file: file.path.clone(),
                line: lines.line(name.start()),
            });
        }
    }
    out
}

enum Event {
    Open { brace: usize, namespace: Option<String> },
    Procedure { at: usize, name: String, access: AccessKind },
}

impl Event {
    fn offset(&self) -> usize {
        match self {
            Self::Open { brace, .. } => *brace,
            Self::Procedure { at, .. } => *at,
        }
    }
}

struct Frame {
    namespace: Option<String>,
    depth: usize,
}

/// Extracts procedures, tracking the enclosing router by brace depth.
#[must_use]
pub fn extract_procedures(file: &SourceFile, mounts: &BTreeMap<String, String>) -> Vec<RpcProcedure> {
    let text = file.text.as_str();
    let code = code_mask(text);
    let mut events = collect_events(text, mounts);
    events.retain(|e| code.get(e.offset()).copied().unwrap_or(false));
    events.sort_by_key(Event::offset);

    let lines = LineIndex::new(text);
    let mut out = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut depth = 0usize;
    let mut pending = events.into_iter().peekable();

    for (i, b) in text.bytes().enumerate() {
        while let Some(event) = pending.next_if(|e| e.offset() == i) {
            match event {
                Event::Open { namespace, .. } => stack.push(Frame { namespace, depth }),
                Event::Procedure { at, name, access } => {
                    let namespace = stack
                        .iter()
                        .rev()
                        .find_map(|f| f.namespace.clone())
                        .unwrap_or_else(|| ROOT_NAMESPACE.to_string());
                    out.push(RpcProcedure {
                        namespace,
                        name,
                        access,
                        file: file.path.clone(),
                        line: lines.line(at),
                    });
                }
            }
        }
        if !code[i] {
            continue;
        }
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                while stack.last().is_some_and(|f| f.depth >= depth) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }
    out
}

fn collect_events(text: &str, mounts: &BTreeMap<String, String>) -> Vec<Event> {
    let mut events = Vec::new();
    if let Some(re) = MEMBER_ROUTER.as_ref() {
        for caps in re.captures_iter(text) {
            let (Some(all), Some(ns)) = (caps.get(0), caps.name("ns")) else {
                continue;
            };
            let ns = ns.as_str();
            events.push(Event::Open {
                brace: all.end() - 1,
                namespace: (!ROOT_ROUTERS.contains(&ns)).then(|| ns.to_string()),
            });
        }
    }
    if let Some(re) = CONST_ROUTER.as_ref() {
        for caps in re.captures_iter(text) {
            let (Some(all), Some(var)) = (caps.get(0), caps.name("var")) else {
                continue;
            };
            events.push(Event::Open {
                brace: all.end() - 1,
                namespace: router_namespace(var.as_str(), mounts),
            });
        }
    }
    if let Some(re) = PROCEDURE.as_ref() {
        for caps in re.captures_iter(text) {
            let (Some(name), Some(builder)) = (caps.name("name"), caps.name("builder")) else {
                continue;
            };
            if SKIP_PROCEDURES.contains(&name.as_str()) {
                continue;
            }
            events.push(Event::Procedure {
                at: name.start(),
                name: name.as_str().to_string(),
                access: AccessKind::from_builder(builder.as_str()),
            });
        }
    }
    events
}

/// Namespace of a standalone router variable: its mount point, else the
/// variable name without its `Router` suffix. Root routers have none.
fn router_namespace(var: &str, mounts: &BTreeMap<String, String>) -> Option<String> {
    if let Some(ns) = mounts.get(var) {
        return Some(ns.clone());
    }
    if ROOT_ROUTERS.contains(&var) {
        return None;
    }
    let ns = var.strip_suffix("Router").unwrap_or(var);
    (!ns.is_empty()).then(|| ns.to_string())
}

/// Marks bytes that are code, as opposed to string literal or comment bodies.
fn code_mask(text: &str) -> Vec<bool> {
    let bytes = text.as_bytes();
    let mut mask = vec![true; bytes.len()];
    let mut i = 0;
    while i < bytes.len() {
        let skip_to = match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                find_from(bytes, i, |b| b == b'\n').unwrap_or(bytes.len())
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => text[i + 2..]
                .find("*/")
                .map_or(bytes.len(), |p| i + 2 + p + 2),
            q @ (b'"' | b'\'' | b'`') => closing_quote(bytes, i, q),
            _ => {
                i += 1;
                continue;
            }
        };
        for m in &mut mask[i..skip_to] {
            *m = false;
        }
        i = skip_to.max(i + 1);
    }
    mask
}

fn find_from(bytes: &[u8], start: usize, pred: impl Fn(u8) -> bool) -> Option<usize> {
    bytes[start..].iter().position(|b| pred(*b)).map(|p| start + p)
}

fn closing_quote(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut j = open + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' if quote != b'`' => return j,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LanguageClass;

    fn backend(path: &str, text: &str) -> SourceFile {
        SourceFile::new(path, text).with_class(LanguageClass::Backend)
    }

    #[test]
    fn test_nested_namespaces() {
        let file = backend(
            "server/routers.ts",
            r#"
export const appRouter = router({
  health: publicProcedure.query(() => "ok"),
  billing: router({
    list: publicProcedure.query(() => {
      return [];
    }),
    createInvoice: protectedProcedure
      .input(z.object({ id: z.string() }))
      .mutation(async () => {}),
  }),
  admin: router({
    purge: adminProcedure.mutation(() => {}),
  }),
});
"#,
        );
        let procs = extract_procedures(&file, &BTreeMap::new());
        let found: Vec<_> = procs
            .iter()
            .map(|p| (p.namespace.as_str(), p.name.as_str(), p.access))
            .collect();
        assert_eq!(
            found,
            [
                ("", "health", AccessKind::Public),
                ("billing", "list", AccessKind::Public),
                ("billing", "createInvoice", AccessKind::Protected),
                ("admin", "purge", AccessKind::Admin),
            ]
        );
        assert_eq!(procs[2].line, 8);
    }

    #[test]
    fn test_standalone_router_resolves_mount() {
        let billing = backend(
            "server/routers/payments.ts",
            "export const paymentsRouter = router({\n  refund: protectedProcedure.mutation(() => {}),\n});\n",
        );
        let root = backend(
            "server/routers.ts",
            "export const appRouter = router({\n  billing: paymentsRouter,\n});\n",
        );
        let mounts = collect_mounts([&billing, &root]);
        let procs = extract_procedures(&billing, &mounts);
        assert_eq!(procs[0].namespace, "billing");

        let unmounted = extract_procedures(&billing, &BTreeMap::new());
        assert_eq!(unmounted[0].namespace, "payments");
    }

    #[test]
    fn test_commented_router_ignored() {
        let file = backend(
            "server/r.ts",
            "// old: router({\nexport const appRouter = router({\n  ping: publicProcedure.query(() => '}'),\n});\n",
        );
        let procs = extract_procedures(&file, &BTreeMap::new());
        assert_eq!(procs.len(), 1);
        assert_eq!(procs[0].namespace, ROOT_NAMESPACE);
    }

    #[test]
    fn test_usage_methods() {
        let file = SourceFile::new(
            "client/src/pages/Billing.tsx",
            r"
const q = trpc.billing.list.useQuery();
const m = trpc.billing.createInvoice.useMutation();
await trpc.billing.refund.mutate({ id });
utils.billing.list.invalidate();
",
        );
        let usages = extract_usages(&file);
        let found: Vec<_> = usages
            .iter()
            .map(|u| (u.namespace.as_str(), u.name.as_str(), u.kind))
            .collect();
        assert!(found.contains(&("billing", "list", RpcMethodKind::Query)));
        assert!(found.contains(&("billing", "createInvoice", RpcMethodKind::Mutation)));
        assert!(found.contains(&("billing", "refund", RpcMethodKind::Mutation)));
        assert!(found.contains(&("billing", "list", RpcMethodKind::Utility)));
        assert_eq!(found.len(), 4);
    }
}
