//! Parsing of soda4LCA Service API documents
//!
//! Nodes differ in which namespaces and prefixes they put on the same
//! elements, so documents are read into a small namespace-free element tree
//! and queried by local name. Documents are at most one listing page or one
//! process, so building the tree is cheap.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::app::models::{
    Dataset, DatasetDetail, DatasetPage, Direction, Exchange, FlowInfo, PageRequest, Stock,
};
use crate::errors::{ApiError, ApiResult};

/// Languages preferred when an element is given in several, English first
const PREFERRED_LANGUAGES: &[&str] = &["en", "de"];

/// An element reduced to local names, attributes, text and children
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// Value of an attribute by local name (`xml:lang` is `lang`)
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed text content, `None` when blank
    pub fn text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    /// First direct child with the given local name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First descendant with the given local name, depth first
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants matching any of `names`
    ///
    /// Matches are not searched further, so nested items of the same kind
    /// are reported once through their outermost element.
    pub fn find_all(&self, names: &[&str]) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect(names, &mut found);
        found
    }

    fn collect<'a>(&'a self, names: &[&str], found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if names.contains(&child.name.as_str()) {
                found.push(child);
            } else {
                child.collect(names, found);
            }
        }
    }

    /// Follow a path: the first segment anywhere below, the rest as children
    pub fn find_path(&self, path: &[&str]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        let mut current = self.find(first)?;
        for segment in rest {
            current = current.child(segment)?;
        }
        Some(current)
    }

    /// Text of the preferred-language variant among children named `name`
    pub fn localized_child_text(&self, name: &str) -> Option<String> {
        let candidates: Vec<&Element> = self.children.iter().filter(|c| c.name == name).collect();
        pick_localized(&candidates)
    }
}

/// Choose the preferred-language text among alternatives
fn pick_localized(candidates: &[&Element]) -> Option<String> {
    for &lang in PREFERRED_LANGUAGES {
        if let Some(text) = candidates
            .iter()
            .filter(|c| c.attr("lang") == Some(lang))
            .find_map(|c| c.text())
        {
            return Some(text.to_string());
        }
    }
    candidates.iter().find_map(|c| c.text()).map(str::to_string)
}

fn local_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn open_element(start: &BytesStart<'_>) -> ApiResult<Element> {
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| ApiError::protocol(e.to_string()))?;
        let key = local_name(attribute.key.local_name().as_ref());
        let value = attribute
            .unescape_value()
            .map_err(|e| ApiError::protocol(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name: local_name(start.local_name().as_ref()),
        attributes,
        ..Default::default()
    })
}

/// Parse a whole document into its root element
pub fn parse_document(content: &[u8]) -> ApiResult<Element> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(start)) => stack.push(open_element(&start)?),
            Ok(Event::Empty(start)) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ApiError::protocol("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| ApiError::protocol(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ApiError::protocol(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ApiError::protocol("unexpected end of document"));
    }
    root.ok_or_else(|| ApiError::protocol("document has no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> ApiResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(ApiError::protocol("more than one root element")),
    }
    Ok(())
}

/// Parse a data stock list
///
/// Entries lacking a UUID or a short name are skipped.
pub fn parse_stocks(content: &[u8]) -> ApiResult<Vec<Stock>> {
    let root = parse_document(content)?;
    let mut stocks = Vec::new();

    for element in root.find_all(&["dataStock"]) {
        let id = element.child("uuid").and_then(Element::text);
        let name = element
            .child("shortName")
            .or_else(|| element.child("name"))
            .and_then(Element::text);
        let (Some(id), Some(name)) = (id, name) else {
            tracing::debug!("Skipping data stock without uuid or name");
            continue;
        };
        stocks.push(Stock {
            id: id.to_string(),
            name: name.to_string(),
            description: element.localized_child_text("description").unwrap_or_default(),
        });
    }

    Ok(stocks)
}

/// Parse one page of a process listing or search
pub fn parse_dataset_page(content: &[u8], request: PageRequest) -> ApiResult<DatasetPage> {
    let root = parse_document(content)?;

    let total_size = match root.attr("totalSize") {
        Some(value) => Some(value.trim().parse::<usize>().map_err(|_| {
            ApiError::protocol(format!("invalid totalSize attribute '{}'", value))
        })?),
        None => None,
    };

    let datasets = root
        .find_all(&["process", "processDataSet"])
        .into_iter()
        .filter_map(parse_process_summary)
        .collect();

    Ok(DatasetPage::new(datasets, request, total_size))
}

fn parse_process_summary(element: &Element) -> Option<Dataset> {
    let uuid = element.find("uuid").and_then(Element::text)?;

    let name = match element.find("baseName") {
        Some(_) => pick_localized(&element.find_all(&["baseName"])),
        None => pick_localized(&element.find_all(&["name"])),
    }?;

    Some(Dataset {
        uuid: uuid.to_string(),
        name,
        version: element
            .find("dataSetVersion")
            .and_then(Element::text)
            .unwrap_or_default()
            .to_string(),
        location: element
            .find("location")
            .and_then(Element::text)
            .map(str::to_string),
    })
}

/// Parse the overview of a single process dataset
pub fn parse_process_detail(content: &[u8]) -> ApiResult<DatasetDetail> {
    let root = parse_document(content)?;

    let info = root.find_path(&["processInformation", "dataSetInformation"]);
    let reference_flow = root
        .find_path(&["quantitativeReference", "referenceToReferenceFlow"])
        .and_then(Element::text)
        .and_then(|text| text.parse::<u32>().ok());

    let exchanges = root
        .find("exchanges")
        .map(|exchanges| {
            exchanges
                .children
                .iter()
                .filter(|c| c.name == "exchange")
                .filter_map(|exchange| parse_exchange(exchange, reference_flow))
                .collect()
        })
        .unwrap_or_default();

    Ok(DatasetDetail {
        uuid: info
            .and_then(|i| i.child("UUID"))
            .and_then(Element::text)
            .map(str::to_string),
        name: info
            .and_then(|i| i.child("name"))
            .and_then(|n| n.localized_child_text("baseName")),
        description: info.and_then(|i| i.localized_child_text("generalComment")),
        reference_year: root
            .find_path(&["processInformation", "time", "referenceYear"])
            .and_then(Element::text)
            .map(str::to_string),
        geography: root
            .find_path(&[
                "processInformation",
                "geography",
                "locationOfOperationSupplyOrProduction",
            ])
            .and_then(|g| g.attr("location"))
            .map(str::to_string),
        technology: root
            .find_path(&["processInformation", "technology"])
            .and_then(|t| t.localized_child_text("technologyDescriptionAndIncludedProcesses")),
        functional_unit: root
            .find("quantitativeReference")
            .and_then(|q| q.localized_child_text("functionalUnitOrOther")),
        has_reference_flow: reference_flow.is_some(),
        exchanges,
    })
}

fn parse_exchange(element: &Element, reference_flow: Option<u32>) -> Option<Exchange> {
    let flow_ref = element.child("referenceToFlowDataSet")?;
    let flow_name = flow_ref.localized_child_text("shortDescription")?;
    let direction = element.child("exchangeDirection").and_then(Element::text)?;
    let amount = element
        .child("meanAmount")
        .and_then(Element::text)?
        .parse::<f64>()
        .ok()?;

    let internal_id = element
        .attr("dataSetInternalID")
        .and_then(|id| id.trim().parse::<u32>().ok());

    Some(Exchange {
        flow_uuid: flow_ref.attr("refObjectId").map(str::to_string),
        flow_name,
        direction: Direction::parse(direction),
        amount,
        is_reference_flow: reference_flow.is_some() && internal_id == reference_flow,
        flow_type: None,
        category: None,
        unit: None,
    })
}

/// Parse the flow listing that accompanies a process's exchanges
pub fn parse_flows(content: &[u8]) -> ApiResult<Vec<FlowInfo>> {
    let root = parse_document(content)?;

    let flows = root
        .find_all(&["flow"])
        .into_iter()
        .filter_map(|flow| {
            let uuid = flow.child("uuid").and_then(Element::text)?;
            let name = flow
                .localized_child_text("name")
                .unwrap_or_else(|| uuid.to_string());
            let categories = flow.find_all(&["category"]);
            let category = categories
                .iter()
                .find(|c| c.attr("level") == Some("2"))
                .or_else(|| categories.first())
                .and_then(|c| c.text())
                .map(str::to_string);
            Some(FlowInfo {
                uuid: uuid.to_string(),
                name,
                flow_type: flow.child("type").and_then(Element::text).map(str::to_string),
                category,
                unit: flow
                    .find("defaultUnit")
                    .and_then(Element::text)
                    .map(str::to_string),
            })
        })
        .collect();

    Ok(flows)
}
