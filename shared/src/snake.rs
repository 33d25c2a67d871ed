use crate::grid::{Direction, Point};

/// A snake owned by one simulation: the ordered body (oldest segment first,
/// head last), the length it is allowed to reach, and its heading.
#[derive(Debug, Clone)]
pub struct Snake {
    body: Vec<Point>,
    max_length: usize,
    direction: Direction,
}

impl Snake {
    pub fn new(start: Point, direction: Direction, max_length: usize) -> Self {
        Self {
            body: vec![start],
            max_length,
            direction,
        }
    }

    pub fn body(&self) -> &[Point] {
        &self.body
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Head cell. A live snake always has one; an empty body is a bug.
    pub fn head(&self) -> Point {
        *self.body.last().expect("snake body is empty")
    }

    /// Change heading. A request for the exact opposite of the current
    /// direction is silently ignored (input debounce, not an error).
    pub fn steer(&mut self, direction: Direction) {
        if direction != self.direction.opposite() {
            self.direction = direction;
        }
    }

    /// Advance one cell, trimming the oldest segment once the body exceeds
    /// the allowed length. Returns the new head.
    pub fn step(&mut self) -> Point {
        let (dx, dy) = self.direction.delta();
        let head = self.head().move_by(dx, dy);
        self.body.push(head);

        if self.body.len() > self.max_length {
            self.body.remove(0);
        }

        head
    }

    /// Allow one more cell of length, visible from the next `step()` on.
    pub fn grow(&mut self) {
        self.max_length += 1;
    }

    pub fn is_self_colliding(&self) -> bool {
        match self.body.split_last() {
            Some((head, rest)) => rest.contains(head),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake_at(x: i32, y: i32, direction: Direction) -> Snake {
        Snake::new(Point::new(x, y), direction, 10)
    }

    #[test]
    fn test_steer_ignores_reversal() {
        for dir in [
            Direction::Up,
            Direction::Left,
            Direction::Down,
            Direction::Right,
        ] {
            let mut snake = snake_at(5, 5, dir);
            snake.steer(dir.opposite());
            assert_eq!(snake.direction(), dir);
        }
    }

    #[test]
    fn test_steer_accepts_turns() {
        let mut snake = snake_at(5, 5, Direction::Right);
        snake.steer(Direction::Up);
        assert_eq!(snake.direction(), Direction::Up);
        snake.steer(Direction::Left);
        assert_eq!(snake.direction(), Direction::Left);
    }

    #[test]
    fn test_step_moves_right_across_board() {
        let mut snake = snake_at(40, 30, Direction::Right);

        for _ in 0..3 {
            snake.step();
        }

        assert_eq!(
            snake.body(),
            &[
                Point::new(40, 30),
                Point::new(41, 30),
                Point::new(42, 30),
                Point::new(43, 30),
            ]
        );
        assert_eq!(snake.head(), Point::new(43, 30));
    }

    #[test]
    fn test_step_trims_to_max_length() {
        let mut snake = Snake::new(Point::new(0, 0), Direction::Right, 3);

        for i in 1..=6 {
            let head = snake.step();
            assert_eq!(head, Point::new(i, 0));
            assert!(snake.body().len() <= snake.max_length());
        }

        // oldest segments dropped, newest kept
        assert_eq!(
            snake.body(),
            &[Point::new(4, 0), Point::new(5, 0), Point::new(6, 0)]
        );
    }

    #[test]
    fn test_grow_takes_effect_next_step() {
        let mut snake = Snake::new(Point::new(0, 0), Direction::Right, 2);
        snake.step();
        snake.step();
        assert_eq!(snake.body().len(), 2);

        snake.grow();
        // growing does not retroactively extend the body
        assert_eq!(snake.body().len(), 2);
        assert_eq!(snake.max_length(), 3);

        snake.step();
        assert_eq!(snake.body().len(), 3);
    }

    #[test]
    fn test_straight_snake_is_not_self_colliding() {
        let mut snake = Snake::new(Point::new(0, 0), Direction::Right, 10);
        for _ in 0..5 {
            snake.step();
        }
        assert!(!snake.is_self_colliding());
    }

    #[test]
    fn test_tight_turn_collides_with_body() {
        // long enough that a U-turn walks back onto itself
        let mut snake = Snake::new(Point::new(10, 10), Direction::Right, 10);
        for _ in 0..4 {
            snake.step();
        }

        snake.steer(Direction::Down);
        snake.step();
        snake.steer(Direction::Left);
        snake.step();
        snake.steer(Direction::Up);
        snake.step();
        assert!(snake.is_self_colliding());
    }

    #[test]
    #[should_panic(expected = "snake body is empty")]
    fn test_head_panics_on_empty_body() {
        let snake = Snake {
            body: Vec::new(),
            max_length: 10,
            direction: Direction::Right,
        };
        snake.head();
    }
}
