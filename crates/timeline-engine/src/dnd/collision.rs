//! Grid collision strategy
//!
//! Drop targets are day cells of a grid and never overlap, so the first
//! rectangle containing the pointer is the only one. The scan stops there
//! instead of collecting every intersection.

use crate::geometry::{Point, Rect};

/// A drop target as the hit-test sees it
#[derive(Debug, Clone, PartialEq)]
pub struct DropCandidate<Id> {
    pub id: Id,
    pub rect: Rect,
}

/// Id of the target under the pointer, or `None` over non-droppable space
pub fn grid_collision<'a, Id, I>(pointer: Point, candidates: I) -> Option<Id>
where
    Id: Clone + 'a,
    I: IntoIterator<Item = &'a DropCandidate<Id>>,
{
    candidates
        .into_iter()
        .find(|c| c.rect.contains(pointer))
        .map(|c| c.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_of_cells(n: usize) -> Vec<DropCandidate<String>> {
        (0..n)
            .map(|i| DropCandidate {
                id: format!("cell-{}", i),
                rect: Rect::new(i as f64 * 100.0, 50.0, 100.0, 40.0),
            })
            .collect()
    }

    #[test]
    fn test_pointer_inside_one_cell() {
        let cells = row_of_cells(5);
        assert_eq!(grid_collision(Point::new(250.0, 60.0), &cells), Some("cell-2".to_string()));
        assert_eq!(grid_collision(Point::new(0.0, 50.0), &cells), Some("cell-0".to_string()));
    }

    #[test]
    fn test_pointer_outside_every_cell() {
        let cells = row_of_cells(5);
        assert_eq!(grid_collision(Point::new(250.0, 10.0), &cells), None);
        assert_eq!(grid_collision(Point::new(500.0, 60.0), &cells), None);
        assert_eq!(grid_collision::<String, _>(Point::new(1.0, 1.0), &[]), None);
    }

    #[test]
    fn test_every_cell_centre_maps_back_to_itself() {
        let cells = row_of_cells(30);
        for cell in &cells {
            let centre = Point::new(cell.rect.x + cell.rect.width / 2.0, cell.rect.y + cell.rect.height / 2.0);
            assert_eq!(grid_collision(centre, &cells), Some(cell.id.clone()));
        }
    }
}
