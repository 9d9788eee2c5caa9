//! The experiment matrix: designs × criteria × materials.
//!
//! The parallel strategy collapses the material axis — one question per
//! (design, criterion) covers every material at once. Every other
//! strategy walks the full cross product.

use crate::config::MatrixConfig;
use crate::prompt::QuestionType;

/// One question to ask: a single point in the experiment matrix.
#[derive(Debug, Clone)]
pub struct Cell {
    pub design: String,
    pub criterion: String,
    pub material: String,
    pub question_type: QuestionType,
}

#[derive(Debug, Clone)]
pub struct ExperimentMatrix {
    designs: Vec<String>,
    criteria: Vec<String>,
    materials: Vec<String>,
}

impl ExperimentMatrix {
    pub fn from_config(config: &MatrixConfig) -> Self {
        Self {
            designs: config.designs.clone(),
            criteria: config.criteria.clone(),
            materials: config.materials.clone(),
        }
    }

    /// Comma-joined material list, as embedded in parallel prompts and
    /// recorded in parallel rows.
    pub fn joined_materials(&self) -> String {
        self.materials.join(", ")
    }

    /// Enumerate the cells for one strategy, in dataset row order.
    pub fn cells(&self, question_type: QuestionType) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(self.cell_count(question_type));
        for design in &self.designs {
            for criterion in &self.criteria {
                if question_type == QuestionType::Parallel {
                    cells.push(Cell {
                        design: design.clone(),
                        criterion: criterion.clone(),
                        material: self.joined_materials(),
                        question_type,
                    });
                } else {
                    for material in &self.materials {
                        cells.push(Cell {
                            design: design.clone(),
                            criterion: criterion.clone(),
                            material: material.clone(),
                            question_type,
                        });
                    }
                }
            }
        }
        cells
    }

    pub fn cell_count(&self, question_type: QuestionType) -> usize {
        let base = self.designs.len() * self.criteria.len();
        if question_type == QuestionType::Parallel {
            base
        } else {
            base * self.materials.len()
        }
    }

    /// LLM calls needed for one table. Chain-of-thought costs two calls
    /// per cell; the agentic count is a lower bound (one call per cell
    /// before any tool iterations).
    pub fn call_count(&self, question_type: QuestionType) -> usize {
        let cells = self.cell_count(question_type);
        if question_type == QuestionType::ChainOfThought {
            cells * 2
        } else {
            cells
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatrixConfig;

    fn default_matrix() -> ExperimentMatrix {
        ExperimentMatrix::from_config(&MatrixConfig::default())
    }

    #[test]
    fn default_cell_counts() {
        let matrix = default_matrix();
        // 4 designs × 4 criteria × 9 materials
        assert_eq!(matrix.cell_count(QuestionType::ZeroShot), 144);
        assert_eq!(matrix.cell_count(QuestionType::Agentic), 144);
        // parallel collapses the material axis
        assert_eq!(matrix.cell_count(QuestionType::Parallel), 16);
        // chain-of-thought makes two calls per cell
        assert_eq!(matrix.call_count(QuestionType::ChainOfThought), 288);
    }

    #[test]
    fn cells_match_counts() {
        let matrix = default_matrix();
        for qt in QuestionType::ALL {
            assert_eq!(matrix.cells(qt).len(), matrix.cell_count(qt));
        }
    }

    #[test]
    fn parallel_cells_carry_the_full_material_list() {
        let matrix = default_matrix();
        let cells = matrix.cells(QuestionType::Parallel);
        assert!(cells.iter().all(|c| c.material == matrix.joined_materials()));
        assert!(cells[0].material.contains("steel"));
        assert!(cells[0].material.contains("composite"));
    }

    #[test]
    fn row_order_is_design_major() {
        let matrix = default_matrix();
        let cells = matrix.cells(QuestionType::ZeroShot);
        assert_eq!(cells[0].design, "kitchen utensil grip");
        assert_eq!(cells[0].criterion, "lightweight");
        assert_eq!(cells[0].material, "steel");
        // second cell advances the material axis first
        assert_eq!(cells[1].material, "aluminum");
        assert_eq!(cells[1].design, "kitchen utensil grip");
    }
}
