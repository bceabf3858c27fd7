use crate::description::FlowDescription;
use crate::error::FlowError;
use ahash::AHashMap;
use tracing::debug;

enum Frame<'a> {
    Enter(&'a str),
    Exit(&'a str),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the path currently being walked.
    OnPath,
    /// Fully explored without finding a cycle.
    Done,
}

/// Walks the description from its first element and fails on the first element
/// that is reached again from within its own path.
///
/// Branches of a gateway are walked independently, so two branches sharing a later
/// element is not a cycle. Unknown or absent links end a path.
pub fn check_acyclic(description: &FlowDescription) -> Result<(), FlowError> {
    let mut marks: AHashMap<&str, Mark> = AHashMap::new();
    let mut stack = Vec::new();

    if let Some((first, _)) = description.resolve(description.first_element_id.as_deref()) {
        stack.push(Frame::Enter(first));
    }

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Exit(id) => {
                marks.insert(id, Mark::Done);
            }
            Frame::Enter(id) => {
                match marks.get(id) {
                    Some(Mark::OnPath) => {
                        debug!(element = id, "Cycle detected");
                        return Err(FlowError::Cycle {
                            element_id: id.to_string(),
                        });
                    }
                    // Everything reachable from here was already walked.
                    Some(Mark::Done) => continue,
                    None => {}
                }
                let Some(element) = description.element(id) else {
                    continue;
                };

                marks.insert(id, Mark::OnPath);
                stack.push(Frame::Exit(id));
                for next in element.next_ids().into_iter().rev() {
                    if let Some((next_id, _)) = description.resolve(next) {
                        stack.push(Frame::Enter(next_id));
                    }
                }
            }
        }
    }

    Ok(())
}
