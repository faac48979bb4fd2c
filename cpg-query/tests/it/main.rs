mod support;

mod call_graph_depth_bound;
mod field_accessor_classification;
