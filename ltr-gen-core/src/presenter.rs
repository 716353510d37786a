//! Human-readable dump of a model's tables.

use std::fmt;

use crate::model::alphabet;
use crate::model::ltr_model::Model;
use crate::model::table::{Context, Distribution, ProbabilityTable};

/// Renders every table of a model: one row per symbol with its cdf, pdf and
/// count, then the column total and bucket count.
///
/// Rows with zero pdf are left out unless `show_all` is set.
pub struct TableDump<'a> {
	model: &'a Model,
	show_all: bool,
}

impl<'a> TableDump<'a> {
	pub fn new(model: &'a Model, show_all: bool) -> Self {
		Self { model, show_all }
	}

	fn write_table(&self, f: &mut fmt::Formatter<'_>, title: &str, table: &ProbabilityTable) -> fmt::Result {
		writeln!(f, "{}", title)?;
		for context in Context::ALL {
			self.write_distribution(f, context, table.get(context))?;
		}
		Ok(())
	}

	fn write_distribution(&self, f: &mut fmt::Formatter<'_>, context: Context, d: &Distribution) -> fmt::Result {
		writeln!(f, "  {}: total {}, buckets {}", context.name(), optional(d.total()), optional(d.buckets()))?;
		for (index, entry) in d.entries().iter().enumerate() {
			if entry.pdf == 0.0 && !self.show_all {
				continue;
			}
			writeln!(
				f,
				"    {}  cdf {:.6}  pdf {:.6}  count {}",
				letter(index),
				entry.cdf,
				entry.pdf,
				optional(entry.count)
			)?;
		}
		Ok(())
	}
}

fn optional(value: Option<u32>) -> String {
	value.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

fn letter(index: usize) -> char {
	alphabet::symbol(index).unwrap_or('?')
}

impl fmt::Display for TableDump<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let n = self.model.num_letters();
		writeln!(f, "LTR model, {} letters", n)?;

		self.write_table(f, "singles", self.model.singles())?;
		for first in 0..n {
			self.write_table(f, &format!("doubles[{}]", letter(first)), self.model.double(first))?;
		}
		for first in 0..n {
			for second in 0..n {
				let title = format!("triples[{}][{}]", letter(first), letter(second));
				self.write_table(f, &title, self.model.triple(first, second))?;
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sparse_model() -> Model {
		let d = Distribution::from_cdfs(&[0.0, 1.0]);
		let table = ProbabilityTable { start: d.clone(), middle: d.clone(), end: d };
		Model::new(2, table.clone(), vec![table.clone(); 2], vec![table; 4]).unwrap()
	}

	#[test]
	fn zero_rows_hidden_unless_asked() {
		let model = sparse_model();
		let terse = TableDump::new(&model, false).to_string();
		let full = TableDump::new(&model, true).to_string();

		assert!(terse.starts_with("LTR model, 2 letters\nsingles\n"));
		assert!(terse.contains("triples[b][a]"));
		assert!(!terse.contains("    a  cdf"));
		assert!(terse.contains("    b  cdf 1.000000  pdf 1.000000  count -"));
		assert!(full.contains("    a  cdf 0.000000  pdf 0.000000  count -"));
		assert!(full.contains("  end: total -, buckets -"));
	}
}
