mod support;

mod go_struct_and_method;
mod if_elif_else;
mod js_method_chain_rhs;
mod python_import;
