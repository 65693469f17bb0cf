//! Registration of the built-in known types.

use mtx_hir::{BinaryOperator, ConcatenationDirection, Ident, SubscriptMethod};

use crate::library::Library;
use crate::store::TypeStore;
use crate::types::{AbstractionKind, Header, TypeId};

/// Installs the built-in free functions, subscript schemes, operator
/// methods, and subscript-capable types. The named scalars and the
/// subtype chain are created by `Library::new`.
pub fn install(library: &mut Library, store: &mut TypeStore) {
    make_subscript_references(library, store);
    make_free_functions(library, store);
    make_concatenations(library, store);
    make_double_methods(library, store);
    make_subsindex_methods(library, store);
}

fn register_simple_function(
    library: &mut Library,
    store: &mut TypeStore,
    name: &str,
    args: Vec<TypeId>,
    outs: Vec<TypeId>,
) -> TypeId {
    let inputs = store.make_input_destructured_tuple(args);
    let outputs = store.make_output_destructured_tuple(outs);
    let kind = AbstractionKind::function(Ident::new(name), None);
    let header = kind.header();
    let func = store.make_abstraction(kind, inputs, outputs);
    library.function_types.insert(header, func);
    func
}

fn make_free_functions(library: &mut Library, store: &mut TypeStore) {
    let double = library.double_type;
    let char_t = library.char_type;
    let string = library.string_type;
    let logical = library.logical_type;
    let sub_double = library.sub_double_type;
    let sub_sub_double = library.sub_sub_double_type;

    register_simple_function(library, store, "sum", vec![double], vec![double]);
    register_simple_function(
        library,
        store,
        "min",
        vec![double, string],
        vec![double, char_t],
    );

    //  (double, list<double>) -> double
    let in_list = store.make_list(vec![double]);
    register_simple_function(library, store, "in_list", vec![double, in_list], vec![double]);

    //  (double) -> (double, list<char, double>)
    let out_pair = store.make_list(vec![char_t, double]);
    register_simple_function(library, store, "lists", vec![double], vec![double, out_pair]);

    //  (double) -> list<double>
    let out_list = store.make_list(vec![double]);
    register_simple_function(library, store, "out_list", vec![double], vec![out_list]);

    register_simple_function(library, store, "sub_double", vec![], vec![sub_double]);
    register_simple_function(
        library,
        store,
        "sub_sub_double",
        vec![],
        vec![sub_sub_double],
    );
    register_simple_function(library, store, "double", vec![sub_double], vec![double]);

    register_simple_function(library, store, "true", vec![], vec![logical]);
    register_simple_function(library, store, "false", vec![], vec![logical]);

    //  in_func expects `sum` itself as its argument.
    let sum_inputs = store.make_input_destructured_tuple(vec![double]);
    let sum_outputs = store.make_output_destructured_tuple(vec![double]);
    let sum_arg = store.make_abstraction(
        AbstractionKind::function(Ident::new("sum"), None),
        sum_inputs,
        sum_outputs,
    );
    register_simple_function(library, store, "in_func", vec![sum_arg], vec![double]);

    make_feval(library, store);
    make_deal(library, store);
}

//  feval: forall P R. ((P...) -> R, P...) -> R
fn make_feval(library: &mut Library, store: &mut TypeStore) {
    let arg_pack = store.make_fresh_parameters();
    let result = store.make_fresh_variable();
    let callee = store.make_abstraction(AbstractionKind::Anonymous, arg_pack, result);

    let inputs = store.make_input_destructured_tuple(vec![callee, arg_pack]);
    let kind = AbstractionKind::function(Ident::new("feval"), None);
    let header = kind.header();
    let func = store.make_abstraction(kind, inputs, result);
    let scheme = store.make_scheme(func, vec![arg_pack, result]);

    library.function_types.insert(header, scheme);
}

//  deal: forall P. (P...) -> (P...)
fn make_deal(library: &mut Library, store: &mut TypeStore) {
    let arg_pack = store.make_fresh_parameters();
    let inputs = store.make_input_destructured_tuple(vec![arg_pack]);
    let outputs = store.make_output_destructured_tuple(vec![arg_pack]);
    let kind = AbstractionKind::function(Ident::new("deal"), None);
    let header = kind.header();
    let func = store.make_abstraction(kind, inputs, outputs);
    let scheme = store.make_scheme(func, vec![arg_pack]);

    library.function_types.insert(header, scheme);
}

fn make_subscript_references(library: &mut Library, store: &mut TypeStore) {
    //  parens: forall T. (T, list<double>) -> T
    let ref_var = store.make_fresh_variable();
    let indices = store.make_list(vec![library.double_type]);
    let inputs = store.make_input_destructured_tuple(vec![ref_var, indices]);
    let outputs = store.make_output_destructured_tuple(vec![ref_var]);
    let func = store.make_abstraction(
        AbstractionKind::Subscript(SubscriptMethod::Parens),
        inputs,
        outputs,
    );
    let scheme = store.make_scheme(func, vec![ref_var]);
    library
        .function_types
        .insert(Header::Subscript(SubscriptMethod::Parens), scheme);

    for ty in [
        library.double_type,
        library.char_type,
        library.string_type,
        library.sub_double_type,
    ] {
        library.add_type_with_known_subscript(ty);
    }

    //  brace: forall T. ({T}, list<double>) -> T
    let ref_var = store.make_fresh_variable();
    let tuple = store.make_tuple(vec![ref_var]);
    let indices = store.make_list(vec![library.double_type]);
    let inputs = store.make_input_destructured_tuple(vec![tuple, indices]);
    let outputs = store.make_output_destructured_tuple(vec![ref_var]);
    let func = store.make_abstraction(
        AbstractionKind::Subscript(SubscriptMethod::Brace),
        inputs,
        outputs,
    );
    let scheme = store.make_scheme(func, vec![ref_var]);
    library
        .function_types
        .insert(Header::Subscript(SubscriptMethod::Brace), scheme);
    library.add_type_with_known_subscript(tuple);
}

//  horizontal concatenation: forall T. (list<T>) -> T
fn make_concatenations(library: &mut Library, store: &mut TypeStore) {
    let tvar = store.make_fresh_variable();
    let args = store.make_list(vec![tvar]);
    let inputs = store.make_input_destructured_tuple(vec![args]);
    let outputs = store.make_output_destructured_tuple(vec![tvar]);
    let kind = AbstractionKind::Concatenation(ConcatenationDirection::Horizontal);
    let header = kind.header();
    let cat = store.make_abstraction(kind, inputs, outputs);
    let scheme = store.make_scheme(cat, vec![tvar]);

    library.function_types.insert(header, scheme);
}

fn make_double_methods(library: &mut Library, store: &mut TypeStore) {
    use BinaryOperator::*;

    let double = library.double_type;
    let class = library
        .class_for_type(store, double)
        .expect("double has a class wrapper");

    for op in [Plus, Minus, Times, MatrixTimes, RightDivide, Colon] {
        let inputs = store.make_input_destructured_tuple(vec![double, double]);
        let outputs = store.make_output_destructured_tuple(vec![double]);
        let kind = AbstractionKind::BinaryOperator(op);
        let header = kind.header();
        let method = store.make_abstraction(kind, inputs, outputs);
        library.method_store.add_method(class, header, method);
    }
}

//  subsindex on the double family lets plain numeric subscripts validate.
fn make_subsindex_methods(library: &mut Library, store: &mut TypeStore) {
    let subsindex = library.special.subsindex;
    for ty in [
        library.double_type,
        library.sub_double_type,
        library.sub_sub_double_type,
    ] {
        let class = library
            .class_for_type(store, ty)
            .expect("scalar has a class wrapper");
        let inputs = store.make_input_destructured_tuple(vec![ty]);
        let outputs = store.make_output_destructured_tuple(vec![library.double_type]);
        let kind = AbstractionKind::function(subsindex, None);
        let header = kind.header();
        let method = store.make_abstraction(kind, inputs, outputs);
        library.method_store.add_method(class, header, method);
    }
}
