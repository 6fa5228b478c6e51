pub mod causal_graph;
pub mod corr;
pub mod count;
pub mod grouped_bar;

mod axes_draw;
