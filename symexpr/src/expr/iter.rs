use super::Expr;

/// An iterator that traverses a tree of expressions in left-to-right post-order (children before
/// parents), without recursing.
///
/// This iterator is created by [`Expr::post_order_iter`].
pub struct ExprIter<'a> {
    stack: Vec<&'a Expr>,
    last_visited: Option<&'a Expr>,
}

impl<'a> ExprIter<'a> {
    pub(super) fn new(expr: &'a Expr) -> Self {
        Self {
            stack: vec![expr],
            last_visited: None,
        }
    }

    /// Pops the current expression off the stack and marks it as the last visited expression.
    fn visit(&mut self) -> Option<&'a Expr> {
        self.last_visited = self.stack.pop();
        self.last_visited
    }

    /// Returns true if the given expression is the node most recently yielded by [`visit`].
    ///
    /// Identity is pointer identity, not structural equality: a tree can contain many structurally
    /// equal subtrees, and only the exact child we descended into counts as visited.
    ///
    /// [`visit`]: Self::visit
    fn is_last_visited(&self, expr: &'a Expr) -> bool {
        match self.last_visited {
            Some(last_visited) => std::ptr::eq(last_visited, expr),
            None => false,
        }
    }
}

impl<'a> Iterator for ExprIter<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let expr = self.stack.last()?;
            match expr {
                Expr::Constant(_) | Expr::Variable(_) => return self.visit(),
                Expr::Unary(_, arg) => {
                    if self.is_last_visited(arg) {
                        return self.visit();
                    }
                    self.stack.push(arg);
                },
                Expr::Sum(args) | Expr::Product(args) => {
                    match args.last() {
                        Some(last) if !self.is_last_visited(last) => {
                            for arg in args.iter().rev() {
                                self.stack.push(arg);
                            }
                        },
                        _ => return self.visit(),
                    }
                },
                Expr::Power(base, exponent) => {
                    if self.is_last_visited(exponent) {
                        return self.visit();
                    }
                    self.stack.push(exponent);
                    self.stack.push(base);
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expr {
        Expr::variable(name).unwrap()
    }

    #[test]
    fn post_order_visits_children_first() {
        let expr = var("x") * var("y") + Expr::constant(2.0);
        let rendered: Vec<String> = expr
            .post_order_iter()
            .map(|node| match node {
                Expr::Constant(value) => value.to_string(),
                Expr::Variable(name) => name.clone(),
                Expr::Sum(_) => "+".to_string(),
                Expr::Product(_) => "*".to_string(),
                other => panic!("unexpected node {other:?}"),
            })
            .collect();
        assert_eq!(rendered, ["x", "y", "*", "2", "+"]);
    }

    #[test]
    fn visits_every_node_exactly_once() {
        let expr = (var("x").sin() + Expr::constant(1.0)).pow(var("y"));
        assert_eq!(expr.post_order_iter().count(), expr.size());
    }
}
