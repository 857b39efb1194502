//! Normalization of one mapping entry into a [`TriplesMap`]

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use starmap_vocab::rdf;
use tracing::debug;

use super::compact::{CompactEntry, CompactObject, Modifier, ObjectText};
use super::section::{one_or_many, scalar_text, Section};
use super::sources::{mapping_sources, mapping_targets};
use crate::error::{MappingError, MappingResult};
use crate::mapping::{
    canonicalize_keys, ExprKind, InlineCall, JoinCondition, JoinKey, MappingRef, ObjectSpec,
    ObjectTerm, PredicateObjectSpec, QuoteFilter, QuotedRef, SourceRef, SubjectSpec, TargetRef,
    Template, TermKind, TriplesMap, UnevaluatedExpr,
};
use crate::materialize::TermResolver;
use crate::vocab::YARRRML;

/// Document-level tables a mapping entry is resolved against
pub(crate) struct MapContext<'a> {
    pub(crate) sources: &'a BTreeMap<String, SourceRef>,
    pub(crate) targets: &'a BTreeMap<String, TargetRef>,
    pub(crate) external: &'a BTreeMap<String, String>,
    /// Expands the constant IRIs of quote filters
    pub(crate) resolver: &'a TermResolver,
}

impl MapContext<'_> {
    fn template(&self, text: &str) -> MappingResult<Template> {
        Ok(Template::parse(text)?.with_externals(self.external))
    }

    fn templates(&self, owner: &str, value: &JsonValue) -> MappingResult<Vec<Template>> {
        one_or_many(value)
            .into_iter()
            .map(|item| {
                let text = scalar_text(item).ok_or_else(|| {
                    MappingError::validation(owner, "expected a template string")
                })?;
                self.template(&text)
            })
            .collect()
    }

    fn expand(&self, owner: &str, text: &str) -> MappingResult<String> {
        if text == YARRRML::A {
            return Ok(rdf::TYPE.to_string());
        }
        self.resolver
            .expand_iri(text)
            .map_err(|failure| MappingError::validation(owner, failure.to_string()))
    }
}

/// Parse one entry of the `mappings` section.
pub(crate) fn parse_mapping(
    name: &str,
    value: &JsonValue,
    ctx: &MapContext<'_>,
) -> MappingResult<TriplesMap> {
    let section = Section::of(name, value, "mapping")?;

    let sources = match section.get(YARRRML::SOURCES)? {
        Some(value) => mapping_sources(name, value, ctx.sources)?,
        None => return Err(MappingError::validation(name, "no source")),
    };
    let subject = parse_subjects(&section, ctx)?;

    let mut map = TriplesMap::new(name, sources, subject);
    if let Some(targets) = section.get(YARRRML::TARGETS)? {
        map.targets = mapping_targets(name, targets, ctx.targets)?;
    }
    if let Some(graphs) = section.get(YARRRML::GRAPHS)? {
        map.graphs = ctx.templates(name, graphs)?;
    }
    if let Some(condition) = section.get(YARRRML::CONDITION)? {
        map.condition = Some(condition_expr(name, condition)?);
    }
    map.predicate_objects = parse_predicate_objects(&section, ctx)?;

    debug!(
        mapping = name,
        sources = map.sources.len(),
        subjects = map.subject.templates.len(),
        predicate_objects = map.predicate_objects.len(),
        annotation = map.is_annotation(),
        "mapping normalized"
    );
    Ok(map)
}

// =============================================================================
// Subjects
// =============================================================================

fn parse_subjects(section: &Section<'_>, ctx: &MapContext<'_>) -> MappingResult<SubjectSpec> {
    let owner = section.owner();
    let value = section
        .get(YARRRML::SUBJECTS)?
        .ok_or_else(|| MappingError::validation(owner, "no subject"))?;

    let mut spec = SubjectSpec::default();
    for item in one_or_many(value) {
        match item {
            JsonValue::Object(_) => subject_entry(owner, item, ctx, &mut spec)?,
            other => {
                let text = scalar_text(other)
                    .ok_or_else(|| MappingError::validation(owner, "subject must be a string"))?;
                spec.templates.push(ctx.template(&text)?);
            }
        }
    }

    if spec.is_quoted() && !spec.templates.is_empty() {
        return Err(MappingError::validation(
            owner,
            "a quoted subject cannot be combined with subject templates",
        ));
    }
    if !spec.is_quoted() && spec.templates.is_empty() && spec.functions.is_empty() {
        return Err(MappingError::validation(owner, "no subject"));
    }
    Ok(spec)
}

fn subject_entry(
    owner: &str,
    item: &JsonValue,
    ctx: &MapContext<'_>,
    spec: &mut SubjectSpec,
) -> MappingResult<()> {
    let entry = Section::of(owner, item, "subject")?;
    if let Some(graphs) = entry.get(YARRRML::GRAPHS)? {
        spec.graphs.extend(ctx.templates(owner, graphs)?);
    }

    let kind = entry.exclusive(&[
        YARRRML::VALUE,
        YARRRML::QUOTED,
        YARRRML::QUOTED_NON_ASSERTED,
        YARRRML::FUNCTION,
    ])?;
    match kind {
        Some("value") => {
            if let Some(text) = entry.get_str(YARRRML::VALUE)? {
                spec.templates.push(ctx.template(&text)?);
            }
        }
        Some("function") => {
            let join = entry
                .get(YARRRML::FUNCTION)?
                .and_then(JsonValue::as_str)
                .and_then(InlineCall::parse)
                .filter(|call| call.name == YARRRML::JOIN);
            match join {
                Some(call) => set_quoted(owner, spec, join_call(owner, &call)?)?,
                None => spec.functions.push(function_expr(owner, item)?),
            }
        }
        Some(_) => {
            if let Some(quoted) = quoted_ref(&entry, ctx)? {
                set_quoted(owner, spec, quoted)?;
            }
        }
        None => {
            // graphs alone override the graphs of the other subject entries
            if spec.graphs.is_empty() {
                return Err(MappingError::validation(
                    owner,
                    "subject entry needs a value, a quoted reference or a function",
                ));
            }
        }
    }
    Ok(())
}

fn set_quoted(owner: &str, spec: &mut SubjectSpec, quoted: QuotedRef) -> MappingResult<()> {
    if spec.quoted.is_some() {
        return Err(MappingError::validation(
            owner,
            "only one quoted reference is allowed as subject",
        ));
    }
    spec.quoted = Some(quoted);
    Ok(())
}

// =============================================================================
// Quoted references and join conditions
// =============================================================================

fn quoted_ref(entry: &Section<'_>, ctx: &MapContext<'_>) -> MappingResult<Option<QuotedRef>> {
    let owner = entry.owner();
    let mut quoted = match (
        entry.get_str(YARRRML::QUOTED)?,
        entry.get_str(YARRRML::QUOTED_NON_ASSERTED)?,
    ) {
        (None, None) => return Ok(None),
        (Some(name), None) => QuotedRef::new(name),
        (None, Some(name)) => QuotedRef::new(name).non_asserted(),
        (Some(_), Some(_)) => {
            return Err(MappingError::validation(
                owner,
                "'quoted' and 'quotedNonAsserted' cannot be combined",
            ))
        }
    };

    if let Some(condition) = entry.get(YARRRML::CONDITION)? {
        let (condition, filter) = join_condition(owner, condition, ctx)?;
        quoted.condition = condition;
        quoted.filter = filter;
    }
    Ok(Some(quoted))
}

/// Read one or more `equal` conditions into a composite join. Quote
/// filters (`predicates`, `graphs`) may sit next to the function.
fn join_condition(
    owner: &str,
    value: &JsonValue,
    ctx: &MapContext<'_>,
) -> MappingResult<(Option<JoinCondition>, QuoteFilter)> {
    let mut keys = Vec::new();
    let mut filter = QuoteFilter::default();

    for item in one_or_many(value) {
        let condition = Section::of(owner, item, "condition")?;
        match condition.get_str(YARRRML::FUNCTION)? {
            Some(function) if is_equal(&function) => {
                let parameters = condition.get(YARRRML::PARAMETERS)?.ok_or_else(|| {
                    MappingError::validation(owner, "'equal' condition has no parameters")
                })?;
                keys.push(equal_key(owner, parameters)?);
            }
            Some(function) => {
                return Err(MappingError::validation(
                    owner,
                    format!("join conditions must use 'equal', found '{}'", function),
                ))
            }
            None if condition.has(YARRRML::PARAMETERS)? => {
                return Err(MappingError::validation(owner, "condition has no function"))
            }
            None => {}
        }

        if let Some(predicates) = condition.get(YARRRML::PREDICATES)? {
            for p in one_or_many(predicates) {
                let text = scalar_text(p).ok_or_else(|| {
                    MappingError::validation(owner, "filter predicates must be strings")
                })?;
                filter.predicates.push(ctx.expand(owner, &text)?);
            }
        }
        if let Some(graphs) = condition.get(YARRRML::GRAPHS)? {
            for g in one_or_many(graphs) {
                let text = scalar_text(g).ok_or_else(|| {
                    MappingError::validation(owner, "filter graphs must be strings")
                })?;
                filter.graphs.push(ctx.expand(owner, &text)?);
            }
        }
    }

    Ok((JoinCondition::new(keys), filter))
}

/// `equal`, possibly written with a function-library prefix
fn is_equal(function: &str) -> bool {
    function
        .rsplit_once(':')
        .map_or(function, |(_, local)| local)
        == YARRRML::EQUAL
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    /// The referencing mapping (`s`)
    Child,
    /// The referenced mapping (`o`)
    Parent,
}

/// The two parameters of `equal`, each `[name, $(column), s|o]` or
/// `{parameter, value, from}`. Without `from`, `str1` is the referencing
/// side and `str2` the referenced one.
fn equal_key(owner: &str, parameters: &JsonValue) -> MappingResult<JoinKey> {
    let mut child = None;
    let mut parent = None;

    for (i, parameter) in one_or_many(parameters).into_iter().enumerate() {
        let (name, value, from) = match parameter {
            JsonValue::Array(parts) => {
                let part = |n: usize| parts.get(n).and_then(scalar_text);
                (part(0), part(1), part(2))
            }
            JsonValue::Object(_) => {
                let p = Section::of(owner, parameter, "parameter")?;
                (
                    p.get_str(YARRRML::PARAMETER)?,
                    p.get_str(YARRRML::VALUE)?,
                    p.get_str(YARRRML::FROM)?,
                )
            }
            _ => {
                return Err(MappingError::validation(
                    owner,
                    "'equal' parameters must be lists or objects",
                ))
            }
        };

        let side = match from.as_deref() {
            Some("s") => Side::Child,
            Some("o") => Side::Parent,
            Some(other) => {
                return Err(MappingError::validation(
                    owner,
                    format!("parameter side must be 's' or 'o', found '{}'", other),
                ))
            }
            None => match name.as_deref() {
                Some("str1") => Side::Child,
                Some("str2") => Side::Parent,
                _ if i == 0 => Side::Child,
                _ => Side::Parent,
            },
        };

        let value = value
            .ok_or_else(|| MappingError::validation(owner, "'equal' parameter has no value"))?;
        let column = column_ref(owner, &value)?;
        let slot = match side {
            Side::Child => &mut child,
            Side::Parent => &mut parent,
        };
        if slot.is_some() {
            return Err(MappingError::validation(
                owner,
                "both parameters of 'equal' are on the same side",
            ));
        }
        *slot = Some(column);
    }

    match (child, parent) {
        (Some(child), Some(parent)) => Ok(JoinKey::new(child, parent)),
        _ => Err(MappingError::validation(owner, "'equal' needs two parameters")),
    }
}

fn column_ref(owner: &str, value: &str) -> MappingResult<String> {
    Template::parse(value)?
        .single_column()
        .map(str::to_string)
        .ok_or_else(|| {
            MappingError::validation(
                owner,
                format!("join parameter '{}' must be a single $(column) reference", value),
            )
        })
}

/// `join(quoted=X, equal(str1=$(a), str2=$(b)), ...)`
fn join_call(owner: &str, call: &InlineCall) -> MappingResult<QuotedRef> {
    let mut quoted = match (call.arg("quoted"), call.arg("quotedNonAsserted")) {
        (Some(name), None) => QuotedRef::new(name),
        (None, Some(name)) => QuotedRef::new(name).non_asserted(),
        _ => {
            return Err(MappingError::validation(
                owner,
                "join() needs exactly one of 'quoted' or 'quotedNonAsserted'",
            ))
        }
    };

    let mut keys = Vec::new();
    for arg in call.positional() {
        let equal = InlineCall::parse(arg)
            .filter(|c| is_equal(&c.name))
            .ok_or_else(|| {
                MappingError::validation(owner, format!("unsupported join argument '{}'", arg))
            })?;
        let (Some(child), Some(parent)) = (equal.arg("str1"), equal.arg("str2")) else {
            return Err(MappingError::validation(owner, "equal() needs 'str1' and 'str2'"));
        };
        keys.push(JoinKey::new(column_ref(owner, child)?, column_ref(owner, parent)?));
    }
    if let Some(condition) = JoinCondition::new(keys) {
        quoted = quoted.with_condition(condition);
    }
    Ok(quoted)
}

// =============================================================================
// Functions and conditions
// =============================================================================

fn function_expr(owner: &str, entry: &JsonValue) -> MappingResult<UnevaluatedExpr> {
    let inline = entry
        .get(YARRRML::FUNCTION[0])
        .or_else(|| YARRRML::FUNCTION[1..].iter().find_map(|k| entry.get(*k)))
        .and_then(JsonValue::as_str)
        .and_then(InlineCall::parse);
    let has_parameters = YARRRML::PARAMETERS.iter().any(|k| entry.get(*k).is_some());

    match inline {
        Some(call) if !has_parameters => {
            Ok(UnevaluatedExpr::from_inline(ExprKind::Function, &call))
        }
        _ => canonicalize_keys(entry)
            .map(|payload| UnevaluatedExpr::new(ExprKind::Function, payload))
            .map_err(|message| MappingError::validation(owner, message)),
    }
}

fn condition_expr(owner: &str, value: &JsonValue) -> MappingResult<UnevaluatedExpr> {
    canonicalize_keys(value)
        .map(|payload| UnevaluatedExpr::new(ExprKind::Condition, payload))
        .map_err(|message| MappingError::validation(owner, message))
}

// =============================================================================
// Predicate-object entries
// =============================================================================

struct Predicate {
    template: Template,
    /// `a` or `rdf:type`: objects default to IRIs
    is_type: bool,
}

enum Object {
    Term {
        template: Template,
        kind: Option<TermKind>,
        datatype: Option<Template>,
        language: Option<Template>,
    },
    Other(ObjectSpec),
}

impl Object {
    fn term(
        owner: &str,
        template: Template,
        kind: Option<TermKind>,
        datatype: Option<Template>,
        language: Option<Template>,
    ) -> MappingResult<Self> {
        if datatype.is_some() && language.is_some() {
            return Err(MappingError::validation(
                owner,
                format!(
                    "object '{}' has both a datatype and a language",
                    template.as_str()
                ),
            ));
        }
        if kind == Some(TermKind::Iri) && (datatype.is_some() || language.is_some()) {
            return Err(MappingError::validation(
                owner,
                format!(
                    "IRI object '{}' cannot have a datatype or a language",
                    template.as_str()
                ),
            ));
        }
        Ok(Object::Term {
            template,
            kind,
            datatype,
            language,
        })
    }

    fn for_predicate(&self, predicate: &Predicate) -> ObjectSpec {
        match self {
            Object::Term {
                template,
                kind,
                datatype,
                language,
            } => {
                let implicit = if predicate.is_type && datatype.is_none() && language.is_none() {
                    TermKind::Iri
                } else {
                    TermKind::Literal
                };
                ObjectSpec::Term(ObjectTerm {
                    template: template.clone(),
                    kind: kind.unwrap_or(implicit),
                    datatype: datatype.clone(),
                    language: language.clone(),
                })
            }
            Object::Other(spec) => spec.clone(),
        }
    }
}

/// A predicate-object entry before cartesian expansion
struct Entry {
    predicates: Vec<Predicate>,
    objects: Vec<Object>,
    inverse: Vec<Template>,
    graphs: Vec<Template>,
    condition: Option<UnevaluatedExpr>,
}

impl Entry {
    /// One spec per (predicate, object) pair. A single inverse predicate
    /// applies to every pair; several are paired with the predicates by
    /// position.
    fn expand(self, owner: &str) -> MappingResult<Vec<PredicateObjectSpec>> {
        let k = self.inverse.len();
        if k > 1 && k != self.predicates.len() {
            return Err(MappingError::validation(
                owner,
                format!(
                    "{} inverse predicates for {} predicates; give one, or one per predicate",
                    k,
                    self.predicates.len()
                ),
            ));
        }

        let mut specs = Vec::with_capacity(self.predicates.len() * self.objects.len());
        for (i, predicate) in self.predicates.iter().enumerate() {
            let inverse = match k {
                0 => None,
                1 => Some(self.inverse[0].clone()),
                _ => Some(self.inverse[i].clone()),
            };
            for object in &self.objects {
                let object = object.for_predicate(predicate);
                if inverse.is_some() && !object.is_resource() {
                    return Err(MappingError::validation(
                        owner,
                        "an inverse predicate needs an IRI object",
                    ));
                }
                specs.push(PredicateObjectSpec {
                    predicate: predicate.template.clone(),
                    object,
                    inverse_predicate: inverse.clone(),
                    graphs: self.graphs.clone(),
                    condition: self.condition.clone(),
                });
            }
        }
        Ok(specs)
    }
}

fn parse_predicate_objects(
    section: &Section<'_>,
    ctx: &MapContext<'_>,
) -> MappingResult<Vec<PredicateObjectSpec>> {
    let owner = section.owner();
    let Some(value) = section.get(YARRRML::PREDICATE_OBJECTS)? else {
        return Ok(Vec::new());
    };
    let items = value.as_array().ok_or_else(|| {
        MappingError::validation(owner, "predicateobjects must be a list")
    })?;

    let mut specs = Vec::new();
    for item in items {
        let entry = match item {
            JsonValue::Array(parts) => compact_entry(owner, parts, ctx)?,
            JsonValue::Object(_) => long_entry(owner, item, ctx)?,
            _ => {
                return Err(MappingError::validation(
                    owner,
                    "a predicate-object entry must be a list or an object",
                ))
            }
        };
        specs.extend(entry.expand(owner)?);
    }
    Ok(specs)
}

fn predicate(ctx: &MapContext<'_>, text: &str) -> MappingResult<Predicate> {
    if text == YARRRML::A {
        return Ok(Predicate {
            template: Template::constant(rdf::TYPE),
            is_type: true,
        });
    }
    let template = ctx.template(text)?;
    let is_type = template
        .as_constant()
        .and_then(|c| ctx.resolver.expand_iri(&c).ok())
        .map_or(false, |iri| iri == rdf::TYPE);
    Ok(Predicate { template, is_type })
}

fn predicates(
    owner: &str,
    value: &JsonValue,
    ctx: &MapContext<'_>,
) -> MappingResult<Vec<Predicate>> {
    one_or_many(value)
        .into_iter()
        .map(|p| {
            let text = scalar_text(p)
                .ok_or_else(|| MappingError::validation(owner, "predicates must be strings"))?;
            predicate(ctx, &text)
        })
        .collect()
}

fn compact_entry(owner: &str, parts: &[JsonValue], ctx: &MapContext<'_>) -> MappingResult<Entry> {
    let entry = CompactEntry::parse(owner, parts)?;
    let predicates = entry
        .predicates
        .iter()
        .map(|p| predicate(ctx, p))
        .collect::<MappingResult<Vec<_>>>()?;
    let objects = entry
        .objects
        .iter()
        .map(|o| compact_term(owner, o, ctx))
        .collect::<MappingResult<Vec<_>>>()?;

    Ok(Entry {
        predicates,
        objects,
        inverse: Vec::new(),
        graphs: Vec::new(),
        condition: None,
    })
}

fn compact_term(
    owner: &str,
    object: &CompactObject,
    ctx: &MapContext<'_>,
) -> MappingResult<Object> {
    let mut kind = object.text.iri.then_some(TermKind::Iri);
    let mut datatype = None;
    let mut language = None;
    match &object.modifier {
        Some(Modifier::Iri) => kind = Some(TermKind::Iri),
        Some(Modifier::Datatype(dt)) => datatype = Some(ctx.template(dt)?),
        Some(Modifier::Language(tag)) => language = Some(ctx.template(tag)?),
        None => {}
    }
    Object::term(
        owner,
        ctx.template(&object.text.value)?,
        kind,
        datatype,
        language,
    )
}

fn long_entry(owner: &str, item: &JsonValue, ctx: &MapContext<'_>) -> MappingResult<Entry> {
    let entry = Section::of(owner, item, "predicate-object entry")?;

    let predicates = match entry.get(YARRRML::PREDICATES)? {
        Some(value) => predicates(owner, value, ctx)?,
        None => Vec::new(),
    };
    let objects = match entry.get(YARRRML::OBJECTS)? {
        Some(value) => one_or_many(value)
            .into_iter()
            .map(|o| match o {
                JsonValue::Object(_) => long_object(owner, o, ctx),
                other => compact_term(owner, &CompactObject::parse(owner, other)?, ctx),
            })
            .collect::<MappingResult<Vec<_>>>()?,
        None => Vec::new(),
    };
    if predicates.is_empty() || objects.is_empty() {
        return Err(MappingError::validation(
            owner,
            "predicate-object entry needs predicates and objects",
        ));
    }

    Ok(Entry {
        predicates,
        objects,
        inverse: match entry.get(YARRRML::INVERSE_PREDICATES)? {
            Some(value) => ctx.templates(owner, value)?,
            None => Vec::new(),
        },
        graphs: match entry.get(YARRRML::GRAPHS)? {
            Some(value) => ctx.templates(owner, value)?,
            None => Vec::new(),
        },
        condition: entry
            .get(YARRRML::CONDITION)?
            .map(|c| condition_expr(owner, c))
            .transpose()?,
    })
}

fn long_object(owner: &str, item: &JsonValue, ctx: &MapContext<'_>) -> MappingResult<Object> {
    let object = Section::of(owner, item, "object")?;
    let kind = object.exclusive(&[
        YARRRML::VALUE,
        YARRRML::MAPPING,
        YARRRML::QUOTED,
        YARRRML::QUOTED_NON_ASSERTED,
        YARRRML::FUNCTION,
    ])?;

    match kind {
        Some("mapping") => {
            let mapping = object
                .get_str(YARRRML::MAPPING)?
                .ok_or_else(|| MappingError::validation(owner, "'mapping' needs a name"))?;
            let condition = match object.get(YARRRML::CONDITION)? {
                Some(value) => {
                    let (condition, filter) = join_condition(owner, value, ctx)?;
                    if !filter.is_empty() {
                        return Err(MappingError::validation(
                            owner,
                            "predicate and graph filters apply to quoted references only",
                        ));
                    }
                    condition
                }
                None => None,
            };
            Ok(Object::Other(ObjectSpec::Reference(MappingRef {
                mapping,
                condition,
            })))
        }
        Some("function") => Ok(Object::Other(ObjectSpec::Function(function_expr(owner, item)?))),
        Some("value") => {
            let written = object
                .get_str(YARRRML::VALUE)?
                .ok_or_else(|| MappingError::validation(owner, "'value' needs a template"))?;
            let text = ObjectText::parse(owner, &written)?;
            let declared = match object.get_str(YARRRML::TYPE)?.as_deref() {
                None => None,
                Some("iri") => Some(TermKind::Iri),
                Some("literal") => Some(TermKind::Literal),
                Some(other) => {
                    return Err(MappingError::validation(
                        owner,
                        format!("object type must be 'iri' or 'literal', found '{}'", other),
                    ))
                }
            };
            let kind = match (declared, text.iri) {
                (Some(TermKind::Literal), true) => {
                    return Err(MappingError::validation(
                        owner,
                        format!("'{}' is marked '~iri' but typed as a literal", written),
                    ))
                }
                (Some(kind), _) => Some(kind),
                (None, true) => Some(TermKind::Iri),
                (None, false) => None,
            };
            let datatype = object
                .get_str(YARRRML::DATATYPE)?
                .map(|dt| ctx.template(&dt))
                .transpose()?;
            let language = object
                .get_str(YARRRML::LANGUAGE)?
                .map(|tag| ctx.template(&tag))
                .transpose()?;
            Object::term(owner, ctx.template(&text.value)?, kind, datatype, language)
        }
        Some(_) => match quoted_ref(&object, ctx)? {
            Some(quoted) => Ok(Object::Other(ObjectSpec::Quoted(quoted))),
            None => Err(MappingError::validation(owner, "'quoted' needs a mapping name")),
        },
        None => Err(MappingError::validation(
            owner,
            "object needs one of 'value', 'mapping', 'quoted', 'quotedNonAsserted' or 'function'",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixture {
        sources: BTreeMap<String, SourceRef>,
        targets: BTreeMap<String, TargetRef>,
        external: BTreeMap<String, String>,
        resolver: TermResolver,
    }

    impl Fixture {
        fn new() -> Self {
            let mut prefixes = BTreeMap::new();
            prefixes.insert("ex".to_string(), "http://example.org/".to_string());
            prefixes.insert("rdf".to_string(), rdf::NS.to_string());
            let mut external = BTreeMap::new();
            external.insert("org".to_string(), "acme".to_string());
            Self {
                sources: BTreeMap::new(),
                targets: BTreeMap::new(),
                external,
                resolver: TermResolver::new(prefixes),
            }
        }

        fn parse(&self, doc: JsonValue) -> MappingResult<TriplesMap> {
            let ctx = MapContext {
                sources: &self.sources,
                targets: &self.targets,
                external: &self.external,
                resolver: &self.resolver,
            };
            parse_mapping("m", &doc, &ctx)
        }
    }

    fn term(spec: &PredicateObjectSpec) -> &ObjectTerm {
        spec.object.as_term().unwrap()
    }

    #[test]
    fn test_cartesian_expansion() {
        let map = Fixture::new()
            .parse(json!({
                "sources": ["people.csv~csv"],
                "s": "ex:person/$(id)",
                "po": [
                    {
                        "p": ["ex:name", "ex:label"],
                        "o": ["$(first)", "$(last)", "$(nick)"],
                        "graphs": "ex:g",
                        "condition": {"function": "ex:notEmpty", "parameters": [["str1", "$(first)"]]}
                    }
                ]
            }))
            .unwrap();

        assert_eq!(map.predicate_objects.len(), 6);
        for po in &map.predicate_objects {
            assert_eq!(po.graphs, vec![Template::parse("ex:g").unwrap()]);
            assert!(po.condition.is_some());
        }
        assert_eq!(map.predicate_objects[0].predicate.as_str(), "ex:name");
        assert_eq!(term(&map.predicate_objects[2]).template.as_str(), "$(nick)");
        assert_eq!(map.predicate_objects[3].predicate.as_str(), "ex:label");
    }

    #[test]
    fn test_compact_modifiers() {
        let map = Fixture::new()
            .parse(json!({
                "sources": ["people.csv~csv"],
                "s": "ex:$(id)",
                "po": [
                    ["a", "ex:Person"],
                    ["rdf:type", "ex:Agent"],
                    ["ex:age", "$(age)", "xsd:integer"],
                    ["ex:name", "$(name)", "en~lang"],
                    ["ex:home", "$(home)~iri"],
                    ["ex:page", "$(page)", "iri"],
                    ["ex:label", "$(label)", "$(lang)~lang"]
                ]
            }))
            .unwrap();

        let po = &map.predicate_objects;
        assert_eq!(po[0].predicate.as_str(), rdf::TYPE);
        assert!(term(&po[0]).kind.is_iri());
        assert!(term(&po[1]).kind.is_iri());
        assert_eq!(
            term(&po[2]).datatype.as_ref().unwrap().as_str(),
            "xsd:integer"
        );
        assert!(term(&po[2]).kind.is_literal());
        assert_eq!(term(&po[3]).language.as_ref().unwrap().as_str(), "en");
        assert!(term(&po[4]).kind.is_iri());
        assert_eq!(term(&po[4]).template.as_str(), "$(home)");
        assert!(term(&po[5]).kind.is_iri());
        assert_eq!(
            term(&po[6]).language.as_ref().unwrap().single_column(),
            Some("lang")
        );
    }

    #[test]
    fn test_long_form_conflicts() {
        let fixture = Fixture::new();
        let with_object = |object: JsonValue| {
            fixture.parse(json!({
                "sources": ["people.csv~csv"],
                "s": "ex:$(id)",
                "po": [{"p": "ex:p", "o": object}]
            }))
        };

        let both = json!({"value": "$(x)", "datatype": "xsd:string", "language": "$(lang)"});
        let both = with_object(both);
        assert!(both.unwrap_err().to_string().contains("both a datatype and a language"));

        let typed_iri = json!({"value": "$(x)", "type": "iri", "datatype": "xsd:string"});
        let typed_iri = with_object(typed_iri);
        assert!(typed_iri.unwrap_err().is_validation());

        let suffix_vs_type = with_object(json!({"value": "$(x)~iri", "type": "literal"}));
        assert!(suffix_vs_type.unwrap_err().to_string().contains("'~iri'"));

        let unknown_type = with_object(json!({"value": "$(x)", "type": "blank"}));
        assert!(unknown_type.is_err());

        let ambiguous = with_object(json!({"value": "$(x)", "v": "$(y)"}));
        assert!(ambiguous.unwrap_err().to_string().contains("ambiguous"));

        let iri = with_object(json!({"value": "$(x)~iri", "type": "iri"})).unwrap();
        assert!(term(&iri.predicate_objects[0]).kind.is_iri());
    }

    #[test]
    fn test_inverse_predicates() {
        let fixture = Fixture::new();
        let map = fixture
            .parse(json!({
                "sources": ["people.csv~csv"],
                "s": "ex:$(id)",
                "po": [{
                    "p": ["ex:knows", "ex:likes"],
                    "i": ["ex:knownBy", "ex:likedBy"],
                    "o": ["ex:$(friend)~iri"]
                }]
            }))
            .unwrap();
        assert_eq!(
            map.predicate_objects[1]
                .inverse_predicate
                .as_ref()
                .unwrap()
                .as_str(),
            "ex:likedBy"
        );

        let literal = fixture.parse(json!({
            "sources": ["people.csv~csv"],
            "s": "ex:$(id)",
            "po": [{"p": "ex:name", "i": "ex:nameOf", "o": "$(name)"}]
        }));
        assert!(literal.unwrap_err().to_string().contains("inverse predicate"));

        let mismatched = fixture.parse(json!({
            "sources": ["people.csv~csv"],
            "s": "ex:$(id)",
            "po": [{"p": ["ex:a", "ex:b", "ex:c"], "i": ["ex:x", "ex:y"], "o": "ex:$(f)~iri"}]
        }));
        assert!(mismatched.is_err());
    }

    #[test]
    fn test_quoted_subject_long_form() {
        let map = Fixture::new()
            .parse(json!({
                "sources": ["prov.csv~csv"],
                "s": {
                    "quotedNonAsserted": "dataset",
                    "condition": {
                        "function": "equal",
                        "parameters": [["str1", "$(ref)", "s"], ["str2", "$(id)", "o"]],
                        "predicates": ["ex:theme", "a"]
                    }
                },
                "po": [["ex:source", "$(src)"]]
            }))
            .unwrap();

        let quoted = map.subject.quoted.as_ref().unwrap();
        assert_eq!(quoted.mapping, "dataset");
        assert!(!quoted.asserted);
        let condition = quoted.condition.as_ref().unwrap();
        assert_eq!(condition.child_columns(), vec!["ref"]);
        assert_eq!(condition.parent_columns(), vec!["id"]);
        assert_eq!(
            quoted.filter.predicates,
            vec!["http://example.org/theme".to_string(), rdf::TYPE.to_string()]
        );
    }

    #[test]
    fn test_quoted_subject_inline_join() {
        let map = Fixture::new()
            .parse(json!({
                "sources": ["prov.csv~csv"],
                "s": [{"function": "join(quoted=dataset, equal(str1=$(ref), str2=$(id)))"}],
                "po": [["ex:source", "$(src)"]]
            }))
            .unwrap();
        let quoted = map.subject.quoted.as_ref().unwrap();
        assert!(quoted.asserted);
        assert_eq!(
            quoted.condition.as_ref().unwrap().keys(),
            &[JoinKey::new("ref", "id")]
        );
    }

    #[test]
    fn test_join_parameter_errors() {
        let fixture = Fixture::new();
        let with_condition = |condition: JsonValue| {
            fixture.parse(json!({
                "sources": ["prov.csv~csv"],
                "s": {"quoted": "dataset", "condition": condition},
                "po": [["ex:source", "$(src)"]]
            }))
        };

        let same_side = with_condition(json!({
            "function": "equal",
            "parameters": [["str1", "$(a)", "s"], ["str2", "$(b)", "s"]]
        }));
        assert!(same_side.unwrap_err().to_string().contains("same side"));

        let not_a_column = with_condition(json!({
            "function": "equal",
            "parameters": [["str1", "x-$(a)"], ["str2", "$(b)"]]
        }));
        assert!(not_a_column.is_err());

        let other_function = with_condition(json!({
            "function": "ex:greaterThan",
            "parameters": [["str1", "$(a)"], ["str2", "$(b)"]]
        }));
        assert!(other_function.unwrap_err().to_string().contains("'equal'"));

        let object_params = with_condition(json!({
            "fn": "idlab-fn:equal",
            "pms": [
                {"parameter": "str2", "value": "$(id)", "from": "o"},
                {"parameter": "str1", "value": "$(ref)", "from": "s"}
            ]
        }))
        .unwrap();
        let quoted = object_params.subject.quoted.as_ref().unwrap();
        assert_eq!(
            quoted.condition.as_ref().unwrap().keys(),
            &[JoinKey::new("ref", "id")]
        );
    }

    #[test]
    fn test_subject_shapes() {
        let fixture = Fixture::new();

        let two = fixture
            .parse(json!({
                "sources": ["p.csv~csv"],
                "subjects": ["ex:person/$(id)", {"value": "ex:$(_org)/$(id)", "graphs": "ex:people"}],
                "po": []
            }))
            .unwrap();
        assert_eq!(two.subject.templates.len(), 2);
        assert_eq!(two.subject.templates[1].as_str(), "ex:acme/$(id)");
        assert_eq!(two.subject.graphs.len(), 1);

        let function = fixture
            .parse(json!({
                "sources": ["p.csv~csv"],
                "s": {"function": "ex:mint(ex:seed = $(id))"}
            }))
            .unwrap();
        assert_eq!(
            function.subject.functions[0].function_name(),
            Some("ex:mint")
        );

        let mixed = fixture.parse(json!({
            "sources": ["p.csv~csv"],
            "s": ["ex:$(id)", {"quoted": "other"}]
        }));
        assert!(mixed.unwrap_err().to_string().contains("cannot be combined"));

        let no_subject = fixture
            .parse(json!({"sources": ["p.csv~csv"]}))
            .unwrap_err();
        assert!(no_subject.to_string().contains("no subject"));
        let no_source = fixture.parse(json!({"s": "ex:$(id)"})).unwrap_err();
        assert!(no_source.to_string().contains("no source"));
    }

    #[test]
    fn test_mapping_and_function_objects() {
        let map = Fixture::new()
            .parse(json!({
                "sources": ["p.csv~csv"],
                "s": "ex:$(id)",
                "po": [
                    {"p": "ex:worksFor", "o": {"mapping": "org", "condition": {
                        "function": "equal", "parameters": [["str1", "$(org_id)"], ["str2", "$(id)"]]
                    }}},
                    {"p": "ex:lower", "o": {"function": "grel:toLowerCase", "parameters": [{"parameter": "grel:valueParameter", "value": "$(name)"}]}}
                ]
            }))
            .unwrap();

        match &map.predicate_objects[0].object {
            ObjectSpec::Reference(r) => {
                assert_eq!(r.mapping, "org");
                assert_eq!(
                    r.condition.as_ref().unwrap().keys(),
                    &[JoinKey::new("org_id", "id")]
                );
            }
            other => panic!("expected a mapping reference, got {:?}", other),
        }
        match &map.predicate_objects[1].object {
            ObjectSpec::Function(f) => {
                assert_eq!(f.kind, ExprKind::Function);
                assert_eq!(f.function_name(), Some("grel:toLowerCase"));
            }
            other => panic!("expected a function, got {:?}", other),
        }
    }
}
