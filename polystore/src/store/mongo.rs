//! The native MongoDB backend.
//!
//! Queries and updates lower to the server's own wire operators, so the
//! server does the filtering, sorting, and pagination. The lowering here
//! must stay behaviorally aligned with the in-process matcher in
//! [crate::filter]; any operator the matcher learns needs a counterpart in
//! [filter_to_bson].

use std::time::Duration;

use mongodb::bson::{doc, Bson, Document as BsonDocument};
use mongodb::options::ClientOptions;
use mongodb::sync::{Client, Collection, Database as MongoDatabase};

use crate::collection::{CollectionProvider, Document, DocumentCollection, FindOptions};
use crate::common::{SortOrder, Value, DOC_ID};
use crate::errors::StoreResult;
use crate::filter::{Clause, FieldCondition, Operator, Query};
use crate::store::StoreBackend;
use crate::update::Update;

/// The MongoDB-backed store.
pub struct MongoBackend {
    client: Client,
    database: MongoDatabase,
}

impl MongoBackend {
    /// Connects to the server and verifies it is reachable with a ping.
    ///
    /// The timeout bounds server selection, so an unreachable server fails
    /// here rather than hanging the first collection operation.
    pub fn connect(url: &str, database_name: &str, timeout: Duration) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(url).run()?;
        options.server_selection_timeout = Some(timeout);
        let client = Client::with_options(options)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .run()?;
        let database = client.database(database_name);
        Ok(MongoBackend { client, database })
    }
}

impl StoreBackend for MongoBackend {
    fn name(&self) -> &'static str {
        "mongodb"
    }

    fn collection(&self, name: &str) -> StoreResult<DocumentCollection> {
        // the server creates collections lazily, so any name is valid here
        Ok(DocumentCollection::new(MongoCollection {
            name: name.to_string(),
            collection: self.database.collection::<BsonDocument>(name),
        }))
    }

    fn close(&self) -> StoreResult<()> {
        self.client.clone().shutdown().run();
        Ok(())
    }
}

/// One collection on the native backend.
struct MongoCollection {
    name: String,
    collection: Collection<BsonDocument>,
}

impl CollectionProvider for MongoCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_one(&self, query: &Query) -> StoreResult<Option<Document>> {
        let found = self.collection.find_one(filter_to_bson(query)).run()?;
        match found {
            Some(bson) => Ok(Some(bson_to_document(bson)?)),
            None => Ok(None),
        }
    }

    fn insert_one(&self, mut document: Document) -> StoreResult<String> {
        let id = document.ensure_id();
        // replace with upsert so a second insert with the same identity
        // overwrites instead of raising a duplicate-key error
        self.collection
            .replace_one(doc! { DOC_ID: &id }, document_to_bson(&document))
            .upsert(true)
            .run()?;
        Ok(id)
    }

    fn update_one(&self, query: &Query, update: &Update) -> StoreResult<u64> {
        let result = self
            .collection
            .update_one(filter_to_bson(query), update_to_bson(update))
            .run()?;
        Ok(result.modified_count)
    }

    fn delete_one(&self, query: &Query) -> StoreResult<u64> {
        let result = self.collection.delete_one(filter_to_bson(query)).run()?;
        Ok(result.deleted_count)
    }

    fn count_documents(&self, query: &Query) -> StoreResult<u64> {
        Ok(self
            .collection
            .count_documents(filter_to_bson(query))
            .run()?)
    }

    fn find_with_options(
        &self,
        query: &Query,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let mut find = self
            .collection
            .find(filter_to_bson(query))
            .limit(options.effective_limit() as i64);
        if let Some(sort) = sort_to_bson(options) {
            find = find.sort(sort);
        }
        if let Some(skip) = options.skip {
            find = find.skip(skip);
        }

        let mut documents = Vec::new();
        for item in find.run()? {
            documents.push(bson_to_document(item?)?);
        }
        Ok(documents)
    }
}

/// Lowers a query to the server's filter document.
///
/// A field that appears in more than one clause cannot share one document
/// key, so the clauses are wrapped in an explicit `$and` in that case.
fn filter_to_bson(query: &Query) -> BsonDocument {
    let parts: Vec<(String, Bson)> = query.clauses.iter().map(clause_to_bson).collect();

    let duplicate_keys = {
        let mut keys: Vec<&str> = parts.iter().map(|(k, _)| k.as_str()).collect();
        keys.sort_unstable();
        keys.windows(2).any(|w| w[0] == w[1])
    };

    if duplicate_keys {
        let wrapped: Vec<Bson> = parts
            .into_iter()
            .map(|(k, v)| {
                let mut single = BsonDocument::new();
                single.insert(k, v);
                Bson::Document(single)
            })
            .collect();
        doc! { "$and": wrapped }
    } else {
        let mut filter = BsonDocument::new();
        for (key, value) in parts {
            filter.insert(key, value);
        }
        filter
    }
}

fn clause_to_bson(clause: &Clause) -> (String, Bson) {
    match clause {
        Clause::Field { field, condition } => match condition {
            FieldCondition::Eq(value) => (field.clone(), value_to_bson(value)),
            FieldCondition::Ops(operators) => {
                let mut ops = BsonDocument::new();
                for operator in operators {
                    match operator {
                        Operator::Gte(bound) => {
                            ops.insert("$gte", value_to_bson(bound));
                        }
                        Operator::Lte(bound) => {
                            ops.insert("$lte", value_to_bson(bound));
                        }
                        Operator::In(candidates) => {
                            let values: Vec<Bson> =
                                candidates.iter().map(value_to_bson).collect();
                            ops.insert("$in", values);
                        }
                        Operator::Regex {
                            pattern,
                            case_insensitive,
                        } => {
                            ops.insert("$regex", pattern.clone());
                            if *case_insensitive {
                                ops.insert("$options", "i");
                            }
                        }
                    }
                }
                (field.clone(), Bson::Document(ops))
            }
        },
        Clause::Or(queries) => {
            let branches: Vec<Bson> = queries
                .iter()
                .map(|q| Bson::Document(filter_to_bson(q)))
                .collect();
            ("$or".to_string(), Bson::Array(branches))
        }
    }
}

fn update_to_bson(update: &Update) -> BsonDocument {
    let mut modifiers = BsonDocument::new();
    for (operator, fields) in [
        ("$set", &update.set),
        ("$inc", &update.inc),
        ("$push", &update.push),
    ] {
        if fields.is_empty() {
            continue;
        }
        let mut section = BsonDocument::new();
        for (field, value) in fields {
            section.insert(field, value_to_bson(value));
        }
        modifiers.insert(operator, section);
    }
    modifiers
}

/// Builds the sort specification, appending an ascending identity key so
/// ties resolve the same way on every run.
fn sort_to_bson(options: &FindOptions) -> Option<BsonDocument> {
    let (field, order) = options.sort_by.as_ref()?;
    let direction = match order {
        SortOrder::Ascending => 1,
        SortOrder::Descending => -1,
    };
    let mut sort = BsonDocument::new();
    sort.insert(field, direction);
    if field != DOC_ID {
        sort.insert(DOC_ID, 1);
    }
    Some(sort)
}

fn document_to_bson(document: &Document) -> BsonDocument {
    let mut bson = BsonDocument::new();
    for (key, value) in document.iter() {
        bson.insert(key, value_to_bson(value));
    }
    bson
}

fn bson_to_document(bson: BsonDocument) -> StoreResult<Document> {
    let mut document = Document::new();
    for (key, value) in bson {
        document.put(&key, bson_to_value(value))?;
    }
    Ok(document)
}

fn value_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::I64(i) => Bson::Int64(*i),
        Value::F64(f) => Bson::Double(*f),
        Value::String(s) => Bson::String(s.clone()),
        Value::DateTime(dt) => {
            Bson::DateTime(mongodb::bson::DateTime::from_millis(dt.timestamp_millis()))
        }
        Value::Array(items) => Bson::Array(items.iter().map(value_to_bson).collect()),
        Value::Document(d) => Bson::Document(document_to_bson(d)),
    }
}

fn bson_to_value(bson: Bson) -> Value {
    match bson {
        Bson::Null => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::I64(i as i64),
        Bson::Int64(i) => Value::I64(i),
        Bson::Double(f) => Value::F64(f),
        Bson::String(s) => Value::String(s),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::DateTime(
            chrono::DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_value).collect()),
        Bson::Document(d) => {
            let mut nested = Document::new();
            for (key, value) in d {
                // nested keys were validated on the way in
                let _ = nested.put(&key, bson_to_value(value));
            }
            Value::Document(nested)
        }
        other => Value::String(other.to_string()),
    }
}
