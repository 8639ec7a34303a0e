//! Main language server implementation

use std::collections::HashMap;
use std::sync::Arc;

use crate::features::diagnostics::alias_diagnostics;
use dspf_analysis::diagnostics::{duplicate_alias_warnings, AliasWarning};
use dspf_analysis::document::{Position as AstPosition, Range as AstRange, SourceText};
use dspf_analysis::document_symbols::{
    collect_document_symbols, DspfDocumentSymbol, DspfSymbolKind,
};
use dspf_analysis::go_to_definition::{resolve_at, Resolution};
use dspf_analysis::parser::{parse_document, ParsedDocument};
use dspf_analysis::references::find_references;
use serde_json::Value;
use tokio::sync::RwLock;
use tower_lsp::async_trait;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    Diagnostic, DidChangeConfigurationParams, DidChangeTextDocumentParams,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, DocumentSymbol, DocumentSymbolParams,
    DocumentSymbolResponse, GotoDefinitionParams, GotoDefinitionResponse, InitializeParams,
    InitializeResult, InitializedParams, Location, OneOf, Position, Range, ReferenceParams,
    ServerCapabilities, ServerInfo, SymbolKind, TextDocumentItem, TextDocumentSyncCapability,
    TextDocumentSyncKind, Url,
};
use tower_lsp::Client;
use tracing::{debug, info};

#[async_trait]
pub trait LspClient: Send + Sync + Clone + 'static {
    async fn publish_diagnostics(&self, uri: Url, diags: Vec<Diagnostic>, version: Option<i32>);
}

#[async_trait]
impl LspClient for Client {
    async fn publish_diagnostics(&self, uri: Url, diags: Vec<Diagnostic>, version: Option<i32>) {
        self.publish_diagnostics(uri, diags, version).await;
    }
}

pub trait FeatureProvider: Send + Sync + 'static {
    fn goto_definition(&self, document: &ParsedDocument, position: AstPosition)
        -> Option<Resolution>;
    fn references(
        &self,
        document: &ParsedDocument,
        position: AstPosition,
        include_declaration: bool,
    ) -> Vec<AstRange>;
    fn document_symbols(
        &self,
        document: &ParsedDocument,
        source: &SourceText,
    ) -> Vec<DspfDocumentSymbol>;
    fn alias_warnings(&self, document: &ParsedDocument) -> Vec<AliasWarning>;
}

#[derive(Default)]
pub struct DefaultFeatureProvider;

impl DefaultFeatureProvider {
    pub fn new() -> Self {
        Self
    }
}

impl FeatureProvider for DefaultFeatureProvider {
    fn goto_definition(
        &self,
        document: &ParsedDocument,
        position: AstPosition,
    ) -> Option<Resolution> {
        resolve_at(document, position)
    }

    fn references(
        &self,
        document: &ParsedDocument,
        position: AstPosition,
        include_declaration: bool,
    ) -> Vec<AstRange> {
        find_references(document, position, include_declaration)
    }

    fn document_symbols(
        &self,
        document: &ParsedDocument,
        source: &SourceText,
    ) -> Vec<DspfDocumentSymbol> {
        collect_document_symbols(document, source)
    }

    fn alias_warnings(&self, document: &ParsedDocument) -> Vec<AliasWarning> {
        duplicate_alias_warnings(document)
    }
}

/// A parsed revision of an open document. Queries reuse it until the next edit.
#[derive(Clone)]
struct DocumentEntry {
    document: Arc<ParsedDocument>,
    source: Arc<SourceText>,
    version: Option<i32>,
}

#[derive(Default)]
struct DocumentStore {
    entries: RwLock<HashMap<Url, DocumentEntry>>,
}

impl DocumentStore {
    async fn upsert(&self, uri: Url, text: &str, version: Option<i32>) -> DocumentEntry {
        let source = SourceText::new(text);
        let document = parse_document(&source);
        debug!(
            %uri,
            ?version,
            formats = document.sections.len(),
            "parsed document"
        );
        let entry = DocumentEntry {
            document: Arc::new(document),
            source: Arc::new(source),
            version,
        };
        self.entries.write().await.insert(uri, entry.clone());
        entry
    }

    async fn get(&self, uri: &Url) -> Option<DocumentEntry> {
        self.entries.read().await.get(uri).cloned()
    }

    async fn remove(&self, uri: &Url) {
        self.entries.write().await.remove(uri);
    }

    async fn uris(&self) -> Vec<Url> {
        self.entries.read().await.keys().cloned().collect()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DspfConfiguration {
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiagnosticsConfig {
    /// Warn about aliases declared more than once in the same record format.
    pub duplicate_aliases: bool,
}

impl DspfConfiguration {
    /// Applies client settings, accepting them either bare or under a `dspf` key.
    pub fn apply(&mut self, settings: &Value) {
        let settings = settings.get("dspf").unwrap_or(settings);
        if let Some(diagnostics) = settings.get("diagnostics") {
            if let Some(enabled) = diagnostics
                .get("duplicateAliases")
                .and_then(|v| v.as_bool())
            {
                self.diagnostics.duplicate_aliases = enabled;
            }
        }
    }
}

pub struct DspfLanguageServer<C = Client, P = DefaultFeatureProvider> {
    client: C,
    documents: DocumentStore,
    features: Arc<P>,
    config: RwLock<DspfConfiguration>,
}

impl DspfLanguageServer<Client, DefaultFeatureProvider> {
    pub fn new(client: Client) -> Self {
        Self::with_features(client, Arc::new(DefaultFeatureProvider::new()))
    }
}

impl<C, P> DspfLanguageServer<C, P>
where
    C: LspClient,
    P: FeatureProvider,
{
    pub fn with_features(client: C, features: Arc<P>) -> Self {
        Self {
            client,
            documents: DocumentStore::default(),
            features,
            config: RwLock::new(DspfConfiguration::default()),
        }
    }

    pub async fn configuration(&self) -> DspfConfiguration {
        self.config.read().await.clone()
    }

    async fn parse_and_store(&self, uri: Url, text: &str, version: Option<i32>) {
        let entry = self.documents.upsert(uri.clone(), text, version).await;
        self.publish_alias_diagnostics(uri, &entry).await;
    }

    async fn publish_alias_diagnostics(&self, uri: Url, entry: &DocumentEntry) {
        let enabled = self.config.read().await.diagnostics.duplicate_aliases;
        let diagnostics = if enabled {
            let warnings = self.features.alias_warnings(&entry.document);
            alias_diagnostics(&warnings)
        } else {
            Vec::new()
        };
        self.client
            .publish_diagnostics(uri, diagnostics, entry.version)
            .await;
    }

    async fn document(&self, uri: &Url) -> Option<Arc<ParsedDocument>> {
        self.documents.get(uri).await.map(|entry| entry.document)
    }
}

fn to_lsp_position(position: &AstPosition) -> Position {
    Position::new(position.line as u32, position.column as u32)
}

fn to_lsp_range(range: &AstRange) -> Range {
    Range {
        start: to_lsp_position(&range.start),
        end: to_lsp_position(&range.end),
    }
}

fn to_lsp_location(uri: &Url, range: &AstRange) -> Location {
    Location {
        uri: uri.clone(),
        range: to_lsp_range(range),
    }
}

fn from_lsp_position(position: Position) -> AstPosition {
    AstPosition::new(position.line as usize, position.character as usize)
}

fn to_definition_response(uri: &Url, resolution: Resolution) -> GotoDefinitionResponse {
    match resolution {
        Resolution::Declaration(range) => {
            GotoDefinitionResponse::Scalar(to_lsp_location(uri, &range))
        }
        Resolution::Usages(ranges) => GotoDefinitionResponse::Array(
            ranges
                .iter()
                .map(|range| to_lsp_location(uri, range))
                .collect(),
        ),
    }
}

fn to_symbol_kind(kind: DspfSymbolKind) -> SymbolKind {
    match kind {
        DspfSymbolKind::Format => SymbolKind::STRUCT,
        DspfSymbolKind::Alias => SymbolKind::FIELD,
    }
}

#[allow(deprecated)]
fn to_document_symbol(symbol: &DspfDocumentSymbol) -> DocumentSymbol {
    DocumentSymbol {
        name: symbol.name.clone(),
        detail: symbol.detail.clone(),
        kind: to_symbol_kind(symbol.kind),
        deprecated: None,
        range: to_lsp_range(&symbol.range),
        selection_range: to_lsp_range(&symbol.selection_range),
        children: if symbol.children.is_empty() {
            None
        } else {
            Some(symbol.children.iter().map(to_document_symbol).collect())
        },
        tags: None,
    }
}

#[async_trait]
impl<C, P> tower_lsp::LanguageServer for DspfLanguageServer<C, P>
where
    C: LspClient,
    P: FeatureProvider,
{
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(options) = params.initialization_options.as_ref() {
            self.config.write().await.apply(options);
        }
        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            definition_provider: Some(OneOf::Left(true)),
            references_provider: Some(OneOf::Left(true)),
            document_symbol_provider: Some(OneOf::Left(true)),
            ..ServerCapabilities::default()
        };

        Ok(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: "dspf-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("dspf-lsp initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let TextDocumentItem {
            uri, text, version, ..
        } = params.text_document;
        self.parse_and_store(uri, &text, Some(version)).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        if let Some(change) = params.content_changes.into_iter().last() {
            let version = Some(params.text_document.version);
            self.parse_and_store(params.text_document.uri, &change.text, version)
                .await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri).await;
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        {
            let mut config = self.config.write().await;
            config.apply(&params.settings);
            debug!(?config, "configuration changed");
        }

        // Re-publish with the new settings; the parsed entries stay valid.
        for uri in self.documents.uris().await {
            if let Some(entry) = self.documents.get(&uri).await {
                self.publish_alias_diagnostics(uri, &entry).await;
            }
        }
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let Some(document) = self.document(&uri).await else {
            return Ok(None);
        };
        let position = from_lsp_position(params.text_document_position_params.position);
        Ok(self
            .features
            .goto_definition(&document, position)
            .map(|resolution| to_definition_response(&uri, resolution)))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = params.text_document_position.text_document.uri;
        if let Some(document) = self.document(&uri).await {
            let position = from_lsp_position(params.text_document_position.position);
            let include_declaration = params.context.include_declaration;
            let ranges = self
                .features
                .references(&document, position, include_declaration);
            if ranges.is_empty() {
                Ok(None)
            } else {
                Ok(Some(
                    ranges
                        .iter()
                        .map(|range| to_lsp_location(&uri, range))
                        .collect(),
                ))
            }
        } else {
            Ok(None)
        }
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        if let Some(entry) = self.documents.get(&params.text_document.uri).await {
            let symbols = self
                .features
                .document_symbols(&entry.document, &entry.source);
            let converted: Vec<DocumentSymbol> = symbols.iter().map(to_document_symbol).collect();
            Ok(Some(DocumentSymbolResponse::Nested(converted)))
        } else {
            Ok(None)
        }
    }
}
