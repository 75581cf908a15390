use crate::error::{NameError, Result};

#[derive(Clone, Debug, PartialEq)]
enum Segment {
	Literal(String),
	Placeholder(String),
}

/// A parsed name template such as `"{given} {surname}"`.
///
/// Placeholders are written `{name}`; `{{` and `}}` produce literal braces.
/// The name is taken verbatim (`{ given }` names the category `" given "`),
/// and format specs or conversions (`{given:>6}`, `{given!r}`) are rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
	source: String,
	segments: Vec<Segment>,
}

impl Template {
	/// # Errors
	/// Returns `InvalidTemplate` for unbalanced braces, an empty placeholder,
	/// or a placeholder carrying a format spec or conversion.
	pub fn parse(template: &str) -> Result<Self> {
		let invalid = |reason: &str| NameError::InvalidTemplate {
			template: template.to_owned(),
			reason: reason.to_owned(),
		};

		let mut segments = Vec::new();
		let mut literal = String::new();
		let mut chars = template.chars().peekable();

		while let Some(c) = chars.next() {
			match c {
				'{' if chars.peek() == Some(&'{') => {
					chars.next();
					literal.push('{');
				}
				'}' if chars.peek() == Some(&'}') => {
					chars.next();
					literal.push('}');
				}
				'{' => {
					let mut name = String::new();
					loop {
						match chars.next() {
							Some('}') => break,
							Some('{') => return Err(invalid("nested '{' in placeholder")),
							Some(c) => name.push(c),
							None => return Err(invalid("unclosed '{'")),
						}
					}
					if name.is_empty() {
						return Err(invalid("empty placeholder"));
					}
					if name.contains([':', '!']) {
						return Err(invalid(&format!("format spec or conversion in '{{{name}}}' is not supported")));
					}
					if !literal.is_empty() {
						segments.push(Segment::Literal(std::mem::take(&mut literal)));
					}
					segments.push(Segment::Placeholder(name));
				}
				'}' => return Err(invalid("single '}' outside a placeholder")),
				c => literal.push(c),
			}
		}
		if !literal.is_empty() {
			segments.push(Segment::Literal(literal));
		}

		Ok(Self {
			source: template.to_owned(),
			segments,
		})
	}

	pub fn as_str(&self) -> &str {
		&self.source
	}

	/// Distinct placeholder names, in order of first appearance.
	pub fn placeholders(&self) -> Vec<&str> {
		let mut names: Vec<&str> = Vec::new();
		for segment in &self.segments {
			if let Segment::Placeholder(name) = segment {
				if !names.contains(&name.as_str()) {
					names.push(name);
				}
			}
		}
		names
	}

	/// Substitutes each placeholder with the value `lookup` gives for it.
	///
	/// Returns `None` if a placeholder has no value.
	pub fn render<'a, F>(&self, lookup: F) -> Option<String>
	where
		F: Fn(&str) -> Option<&'a str>,
	{
		let mut output = String::new();
		for segment in &self.segments {
			match segment {
				Segment::Literal(text) => output.push_str(text),
				Segment::Placeholder(name) => output.push_str(lookup(name)?),
			}
		}
		Some(output)
	}
}
