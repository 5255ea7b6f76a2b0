//! Earth Engine expression graphs.
//!
//! The REST API evaluates a serialized computation graph: a flat table of
//! value nodes keyed by string, plus the key of the result node. Nodes refer
//! to each other with `valueReference`, so shared sub-expressions (the
//! region rectangle, for instance) are written once.

use serde_json::{json, Map, Value};

use crate::models::{BandExpression, Composite, ImageQuery, Region, TimeWindow};

/// Acquisition timestamp property on every collection element.
pub const TIME_START_PROPERTY: &str = "system:time_start";
/// Image identifier property.
pub const INDEX_PROPERTY: &str = "system:index";

const MAPPING_ARGUMENT: &str = "_MAPPING_VAR_0_0";

/// Key of a node in an [`Expression`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node(String);

impl Node {
    fn reference(&self) -> Value {
        json!({ "valueReference": self.0 })
    }
}

/// Builder for a serialized computation graph.
#[derive(Debug, Default)]
pub struct Expression {
    values: Map<String, Value>,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, value: Value) -> Node {
        let key = self.values.len().to_string();
        self.values.insert(key.clone(), value);
        Node(key)
    }

    pub fn constant(&mut self, value: Value) -> Node {
        self.push(json!({ "constantValue": value }))
    }

    /// Call a named algorithm with keyword arguments.
    pub fn invoke(&mut self, function: &str, arguments: &[(&str, &Node)]) -> Node {
        let arguments: Map<String, Value> = arguments
            .iter()
            .map(|(name, node)| (name.to_string(), node.reference()))
            .collect();
        self.push(json!({
            "functionInvocationValue": {
                "functionName": function,
                "arguments": arguments,
            }
        }))
    }

    pub fn argument(&mut self, name: &str) -> Node {
        self.push(json!({ "argumentReference": name }))
    }

    /// Anonymous function of `argument_names` evaluating to `body`.
    pub fn function(&mut self, argument_names: &[&str], body: &Node) -> Node {
        self.push(json!({
            "functionDefinitionValue": {
                "argumentNames": argument_names,
                "body": body.0,
            }
        }))
    }

    pub fn array(&mut self, items: &[&Node]) -> Node {
        let values: Vec<Value> = items.iter().map(|node| node.reference()).collect();
        self.push(json!({ "arrayValue": { "values": values } }))
    }

    /// Serialize the graph with `result` as its output.
    pub fn finish(self, result: &Node) -> Value {
        json!({
            "result": result.0,
            "values": self.values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn rectangle(&mut self, region: &Region) -> Node {
        let coordinates = self.constant(json!([
            region.west,
            region.south,
            region.east,
            region.north
        ]));
        let geodesic = self.constant(json!(false));
        self.invoke(
            "GeometryConstructors.Rectangle",
            &[("coordinates", &coordinates), ("geodesic", &geodesic)],
        )
    }

    fn date_range(&mut self, window: &TimeWindow) -> Node {
        let start = self.constant(json!(window.start_instant().timestamp_millis()));
        let end = self.constant(json!(window.end_exclusive_instant().timestamp_millis()));
        self.invoke("DateRange", &[("start", &start), ("end", &end)])
    }

    fn filter(&mut self, collection: Node, filter: &Node) -> Node {
        self.invoke(
            "Collection.filter",
            &[("collection", &collection), ("filter", filter)],
        )
    }
}

/// Where and how the remote catalog stores the scenes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Asset id, e.g. `COPERNICUS/S2_SR_HARMONIZED`
    pub id: String,
    /// Scene-level cloud estimate property
    pub cloud_property: String,
}

/// Order of the elements of a selected collection by acquisition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeOrder {
    NewestFirst,
    /// `ImageCollection.mosaic` paints later elements on top, so the
    /// newest image must come last.
    OldestFirst,
}

/// Collection restricted to `query` and sorted by acquisition time.
///
/// Returns the collection node together with the region rectangle so
/// callers can reuse it for clipping.
fn selected_collection(
    expr: &mut Expression,
    spec: &CollectionSpec,
    query: &ImageQuery,
    order: TimeOrder,
) -> (Node, Node) {
    let id = expr.constant(json!(spec.id));
    let collection = expr.invoke("ImageCollection.load", &[("id", &id)]);

    let geometry = expr.rectangle(&query.region);
    let all = expr.constant(json!(".all"));
    let bounds = expr.invoke(
        "Filter.intersects",
        &[("leftField", &all), ("rightValue", &geometry)],
    );
    let collection = expr.filter(collection, &bounds);

    let range = expr.date_range(&query.window);
    let time_field = expr.constant(json!(TIME_START_PROPERTY));
    let dates = expr.invoke(
        "Filter.dateRangeContains",
        &[("leftValue", &range), ("rightField", &time_field)],
    );
    let collection = expr.filter(collection, &dates);

    let cloud_field = expr.constant(json!(spec.cloud_property));
    let cloud_max = expr.constant(json!(query.cloud_max.percent()));
    let clouds = expr.invoke(
        "Filter.lessThan",
        &[("leftField", &cloud_field), ("rightValue", &cloud_max)],
    );
    let collection = expr.filter(collection, &clouds);

    let ascending = expr.constant(json!(order == TimeOrder::OldestFirst));
    let sorted = expr.invoke(
        "Collection.limit",
        &[
            ("collection", &collection),
            ("key", &time_field),
            ("ascending", &ascending),
        ],
    );
    (sorted, geometry)
}

/// Graph listing `[ids, acquisition times (ms), cloud estimates]` of the
/// images matching `query`, newest first.
pub fn catalog_expression(spec: &CollectionSpec, query: &ImageQuery) -> Value {
    let mut expr = Expression::new();
    let (collection, _) = selected_collection(&mut expr, spec, query, TimeOrder::NewestFirst);

    let columns: Vec<Node> = [INDEX_PROPERTY, TIME_START_PROPERTY, spec.cloud_property.as_str()]
        .into_iter()
        .map(|property| {
            let property = expr.constant(json!(property));
            expr.invoke(
                "AggregateFeatureCollection.array",
                &[("collection", &collection), ("property", &property)],
            )
        })
        .collect();
    let listing = expr.array(&columns.iter().collect::<Vec<_>>());
    expr.finish(&listing)
}

/// Graph evaluating `composite` to a single image clipped to its region.
///
/// Every image is transformed first, then the collection is mosaicked
/// oldest first. The mosaic keeps the last unmasked pixel, so the most
/// recent acquisition wins.
pub fn composite_expression(spec: &CollectionSpec, composite: &Composite) -> Value {
    let mut expr = Expression::new();
    let (collection, geometry) = selected_collection(&mut expr, spec, &composite.query, TimeOrder::OldestFirst);

    let image = expr.argument(MAPPING_ARGUMENT);
    let body = match &composite.expression {
        BandExpression::NormalizedDifference { nir, red, output } => {
            let band_names = expr.constant(json!([nir, red]));
            let difference = expr.invoke(
                "Image.normalizedDifference",
                &[("input", &image), ("bandNames", &band_names)],
            );
            let names = expr.constant(json!([output]));
            expr.invoke("Image.rename", &[("input", &difference), ("names", &names)])
        }
        BandExpression::Select { bands } => {
            let selectors = expr.constant(json!(bands));
            expr.invoke(
                "Image.select",
                &[("input", &image), ("bandSelectors", &selectors)],
            )
        }
    };
    let algorithm = expr.function(&[MAPPING_ARGUMENT], &body);
    let transformed = expr.invoke(
        "Collection.map",
        &[("collection", &collection), ("baseAlgorithm", &algorithm)],
    );
    let mosaic = expr.invoke("ImageCollection.mosaic", &[("collection", &transformed)]);
    let clipped = expr.invoke("Image.clip", &[("input", &mosaic), ("geometry", &geometry)]);
    expr.finish(&clipped)
}
