use crate::{Edge, GraphModel, LayoutError, MalformedRecord};
use tracing::debug;

/// Parse a newline separated `source,target` edge list
///
/// Blank lines are skipped. Every other line must hold exactly two non-empty
/// comma separated tokens; whitespace around them is trimmed. All malformed
/// lines are reported together and no model is produced for them.
///
/// # Errors
/// Returns [`LayoutError::MalformedRecords`] listing every offending line.
pub fn parse(text: &str) -> Result<GraphModel, LayoutError> {
    let mut model = GraphModel::new();
    let mut malformed = Vec::new();

    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
        match tokens.as_slice() {
            [source, target] if !source.is_empty() && !target.is_empty() => {
                model.insert_node(source);
                model.insert_node(target);
                model.push_edge(Edge::new(source.to_string(), target.to_string()));
            }
            _ => malformed.push(MalformedRecord {
                line: number + 1,
                text: line.trim_end_matches('\r').to_string(),
                fields: tokens.len(),
            }),
        }
    }

    if !malformed.is_empty() {
        debug!("Rejected {} malformed record(s)", malformed.len());
        return Err(LayoutError::MalformedRecords(malformed));
    }

    debug!(
        "Parsed {} nodes and {} edges",
        model.node_count(),
        model.edge_count()
    );
    Ok(model)
}
