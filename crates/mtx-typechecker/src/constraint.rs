//! Constraint generation: a recursive walk over the resolved tree that
//! emits type equations into the substitution and binds local
//! definitions in the library.

use mtx_hir::{
    BinaryOperator, Block, ClassDefId, ClassDefNode, ConcatenationDirection, Expr, FunctionDef,
    FunctionDefId, FunctionDefNode, FunctionRefId, GroupingMethod, Hir, Ident, Node, Param,
    RootBlock, ScopeId, Stmt, Token, UnaryOperator, VariableDefId,
};

use crate::library::Library;
use crate::store::TypeStore;
use crate::substitution::Substitution;
use crate::types::{
    AbstractionKind, ConstantValue, Field, Header, Sub, Term, TypeEquation, TypeEquationTerm,
    TypeId, Usage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Lhs,
    Rhs,
}

#[derive(Debug, Clone, Copy)]
struct ClassContext {
    class_type: TypeId,
}

/// Fresh variables and equations produced inside a polymorphic scope;
/// they become the enclosing scheme's parameters and constraints.
#[derive(Debug, Default)]
struct ConstraintRepository {
    variables: Vec<TypeId>,
    constraints: Vec<TypeEquation>,
}

pub struct ConstraintGenerator<'a> {
    substitution: &'a mut Substitution,
    store: &'a mut TypeStore,
    library: &'a mut Library,
    hir: &'a Hir,
    scopes: Vec<ScopeId>,
    value_category: Vec<Side>,
    assignment_source: Vec<bool>,
    polymorphic: Vec<bool>,
    class_state: Vec<Option<ClassContext>>,
    repositories: Vec<ConstraintRepository>,
}

impl<'a> ConstraintGenerator<'a> {
    pub fn new(
        substitution: &'a mut Substitution,
        store: &'a mut TypeStore,
        library: &'a mut Library,
        hir: &'a Hir,
    ) -> Self {
        Self {
            substitution,
            store,
            library,
            hir,
            scopes: Vec::new(),
            value_category: vec![Side::Rhs],
            assignment_source: vec![false],
            polymorphic: vec![false],
            class_state: vec![None],
            repositories: Vec::new(),
        }
    }

    pub fn root_block(&mut self, root: &RootBlock) {
        self.scopes.push(root.scope);
        self.block(&root.block);
        self.scopes.pop();
    }

    /// Marks subsequently registered function definitions as polymorphic:
    /// their types wrap in a fresh scheme capturing body constraints.
    pub fn push_polymorphic_functions(&mut self) {
        self.polymorphic.push(true);
    }

    pub fn pop_polymorphic_functions(&mut self) {
        self.polymorphic.pop();
    }

    /*
     * State
     */

    fn is_lhs(&self) -> bool {
        self.value_category.last() == Some(&Side::Lhs)
    }

    fn functions_are_polymorphic(&self) -> bool {
        self.polymorphic.last().copied().unwrap_or(false)
    }

    fn struct_is_constructor(&self) -> bool {
        self.assignment_source.last().copied().unwrap_or(false)
    }

    fn current_class(&self) -> Option<ClassContext> {
        self.class_state.last().copied().flatten()
    }

    fn current_scope(&self) -> ScopeId {
        *self.scopes.last().expect("a scope is always active")
    }

    fn make_fresh_variable(&mut self) -> TypeId {
        let var = self.store.make_fresh_variable();
        if let Some(repository) = self.repositories.last_mut() {
            repository.variables.push(var);
        }
        var
    }

    fn push_type_equation(&mut self, eq: TypeEquation) {
        self.substitution.push_type_equation(eq.clone());
        if let Some(repository) = self.repositories.last_mut() {
            repository.constraints.push(eq);
        }
    }

    fn term(token: &Token, term: TypeId) -> TypeEquationTerm {
        TypeEquationTerm::new(Some(token), term)
    }

    /// Evaluates `expr` and seeds the substitution with
    /// `fresh = expr-term`, so the expression's type flows through the
    /// unifier even when no other equation mentions it.
    fn visit_expr(&mut self, expr: &Expr) -> TypeEquationTerm {
        let token = expr.source_token().clone();
        let lhs = TypeEquationTerm::new(Some(&token), self.make_fresh_variable());
        let rhs = self.expr(expr);
        self.push_type_equation(TypeEquation::new(lhs, rhs.clone()));
        rhs
    }

    /*
     * Bindings
     */

    fn require_bound_variable(&mut self, def: VariableDefId) -> TypeId {
        if let Some(&ty) = self.library.local_variable_types.get(&def) {
            return ty;
        }
        let ty = self.make_fresh_variable();
        self.library.local_variable_types.insert(def, ty);
        ty
    }

    /// The local function's type, creating its skeleton on first touch:
    /// an abstraction over fresh input/output tuples, scheme-wrapped when
    /// the polymorphic state is active. Vararg parameters become
    /// parameter packs. The reference handle stays on the abstraction so
    /// resolution can route back to this definition.
    fn require_local_function_type(&mut self, def: FunctionDefId, reference: FunctionRefId) -> TypeId {
        if let Some(ty) = self.library.lookup_local_function(def) {
            return ty;
        }

        let func = self.hir.function(def).clone();
        let inputs = self.make_parameter_members(&func.inputs);
        let outputs = self.make_parameter_members(&func.outputs);
        let mut signature_vars = inputs.clone();
        signature_vars.extend(outputs.iter().copied());
        let input_dt = self.store.make_input_destructured_tuple(inputs);
        let output_dt = self.store.make_output_destructured_tuple(outputs);
        let abstraction = self.store.make_abstraction(
            AbstractionKind::function(func.name, Some(reference)),
            input_dt,
            output_dt,
        );

        let ty = if self.functions_are_polymorphic() {
            //  The signature variables quantify along with whatever the
            //  body later contributes.
            self.store.make_scheme(abstraction, signature_vars)
        } else {
            abstraction
        };

        self.library.emplace_local_function_type(def, ty);
        ty
    }

    fn make_parameter_members(&mut self, params: &[Param]) -> Vec<TypeId> {
        params
            .iter()
            .map(|param| {
                if param.is_vararg {
                    self.store.make_fresh_parameters()
                } else {
                    self.make_fresh_variable()
                }
            })
            .collect()
    }

    fn require_local_class_type(&mut self, def: ClassDefId) -> TypeId {
        if let Some(ty) = self.library.lookup_local_class(def) {
            return ty;
        }

        let class_def = self.hir.class(def).clone();
        let fields = class_def
            .properties
            .iter()
            .map(|&name| {
                let field_name = self.store.make_constant_char(name);
                let field_ty = self.make_fresh_variable();
                Field {
                    name: field_name,
                    ty: field_ty,
                }
            })
            .collect();
        let record = self.store.make_record(fields);
        let class = self.store.make_class(crate::types::ClassType {
            name: class_def.name,
            source: record,
            supertypes: Vec::new(),
        });

        self.library.emplace_local_class_type(def, class);
        class
    }

    /*
     * Blocks and statements
     */

    fn block(&mut self, block: &Block) {
        for node in &block.nodes {
            match node {
                Node::Stmt(stmt) => self.stmt(stmt),
                Node::FunctionDef(node) => {
                    self.function_def_node(node);
                }
                Node::ClassDef(node) => self.class_def_node(node),
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                self.expr(expr);
            }
            Stmt::Assignment { token, to, of } => self.assignment_stmt(token, to, of),
            Stmt::If {
                branches,
                else_block,
            } => {
                for branch in branches {
                    let condition = self.visit_expr(&branch.condition);
                    let logical = Self::term(&branch.token, self.library.logical_type);
                    self.push_type_equation(TypeEquation::new(logical, condition));
                    self.block(&branch.block);
                }
                if let Some(block) = else_block {
                    self.block(block);
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                self.visit_expr(condition);
                self.block(body);
            }
            Stmt::For {
                token,
                loop_variable,
                expr,
                body,
            } => {
                let var_ty = self.require_bound_variable(*loop_variable);
                let var_term = Self::term(token, var_ty);
                let expr_term = self.visit_expr(expr);
                self.push_type_equation(TypeEquation::new(var_term, expr_term));
                self.block(body);
            }
            Stmt::Switch {
                condition,
                cases,
                otherwise,
                ..
            } => {
                let condition_term = self.visit_expr(condition);
                for case in cases {
                    //  case {'a', 'b', 'c'} equates every component with
                    //  the switch condition.
                    if let Expr::Grouping {
                        method: GroupingMethod::Brace,
                        components,
                        ..
                    } = &case.expr
                    {
                        for component in components {
                            let case_term = self.visit_expr(component);
                            self.push_type_equation(TypeEquation::new(
                                condition_term.clone(),
                                case_term,
                            ));
                        }
                    } else {
                        let case_term = self.visit_expr(&case.expr);
                        self.push_type_equation(TypeEquation::new(
                            condition_term.clone(),
                            case_term,
                        ));
                    }
                    self.block(&case.block);
                }
                if let Some(block) = otherwise {
                    self.block(block);
                }
            }
        }
    }

    fn assignment_stmt(&mut self, token: &Token, to: &Expr, of: &Expr) {
        self.assignment_source.push(true);
        let rhs = self.expr(of);
        self.assignment_source.pop();

        self.value_category.push(Side::Lhs);
        let lhs = self.expr(to);
        self.value_category.pop();

        let assignment = self.store.make_assignment(lhs.term, rhs.term);
        let assignment_var = self.make_fresh_variable();

        let lhs_term = TypeEquationTerm::new(lhs.source_token.as_ref(), assignment_var);
        let rhs_term = TypeEquationTerm::new(
            rhs.source_token.as_ref().or(Some(token)),
            assignment,
        );
        self.push_type_equation(TypeEquation::new(lhs_term, rhs_term));
    }

    /*
     * Definitions
     */

    fn function_def_node(&mut self, node: &FunctionDefNode) -> TypeEquationTerm {
        self.scopes.push(node.scope);

        let source_type = self.require_local_function_type(node.def, node.reference);
        let (abstraction_id, is_scheme) = match self.store.get(source_type) {
            Term::Scheme(scheme) => (scheme.ty, true),
            _ => (source_type, false),
        };
        let Term::Abstraction(abstraction) = self.store.get(abstraction_id).clone() else {
            unreachable!("local function types are abstractions");
        };
        let Term::DestructuredTuple(_, input_members) =
            self.store.get(abstraction.inputs).clone()
        else {
            unreachable!("abstraction inputs are destructured tuples");
        };
        let Term::DestructuredTuple(_, output_members) =
            self.store.get(abstraction.outputs).clone()
        else {
            unreachable!("abstraction outputs are destructured tuples");
        };

        let def_data = self.hir.function(node.def).clone();
        let capture = self.functions_are_polymorphic() || is_scheme;
        if capture {
            self.repositories.push(ConstraintRepository::default());
        }

        self.push_function_parameters(&input_members, &def_data.inputs, &node.source_token);
        self.push_function_parameters(&output_members, &def_data.outputs, &node.source_token);

        if let Some(body) = &node.body {
            //  The body is no longer directly inside a class.
            self.class_state.push(None);
            self.polymorphic.push(false);
            self.block(body);
            self.polymorphic.pop();
            self.class_state.pop();
        }

        if capture {
            let repository = self.repositories.pop().unwrap();
            if is_scheme && let Term::Scheme(scheme) = self.store.get_mut(source_type) {
                scheme.constraints.extend(repository.constraints);
                scheme.parameters.extend(repository.variables);
            }
        }

        let rhs_term = Self::term(&node.source_token, source_type);

        if let Some(class_ctx) = self.current_class()
            && def_data.attributes.is_method
        {
            self.handle_class_method(
                &input_members,
                &output_members,
                &def_data,
                abstraction_id,
                &rhs_term,
                class_ctx,
            );
        }

        self.scopes.pop();
        rhs_term
    }

    fn push_function_parameters(&mut self, members: &[TypeId], params: &[Param], header_token: &Token) {
        debug_assert_eq!(members.len(), params.len());
        let scope = self.current_scope();

        for (&member, param) in members.iter().zip(params.iter()) {
            let Some(name) = param.name else {
                continue;
            };
            //  Inside the function, vararg arguments are wrapped in a tuple.
            let assigned = if param.is_vararg {
                self.store.make_tuple(vec![member])
            } else {
                member
            };

            let Some(var) = self.hir.lookup_variable(scope, name) else {
                continue;
            };

            if let Some(&existing) = self.library.local_variable_types.get(&var) {
                //  Duplicate parameter name; an output may share its name
                //  with an input.
                let lhs = Self::term(header_token, existing);
                let rhs = Self::term(header_token, assigned);
                self.push_type_equation(TypeEquation::new(lhs, rhs));
            } else {
                self.library.local_variable_types.insert(var, assigned);
            }
        }
    }

    fn handle_class_method(
        &mut self,
        input_members: &[TypeId],
        output_members: &[TypeId],
        def_data: &FunctionDef,
        abstraction_id: TypeId,
        rhs_term: &TypeEquationTerm,
        ctx: ClassContext,
    ) {
        let attrs = def_data.attributes;
        let class_ty = ctx.class_type;
        let token = rhs_term
            .source_token
            .clone()
            .unwrap_or_else(|| Token::synthetic("method"));

        if !attrs.is_static && !attrs.is_constructor {
            //  The first argument is the receiver.
            if let Some(&first) = input_members.first() {
                let lhs = Self::term(&token, first);
                let rhs = Self::term(&token, class_ty);
                self.push_type_equation(TypeEquation::new(lhs, rhs));
            }
        }

        if attrs.is_constructor
            && let Some(&first) = output_members.first()
        {
            let lhs = Self::term(&token, first);
            let rhs = Self::term(&token, class_ty);
            self.push_type_equation(TypeEquation::new(lhs, rhs));
        }

        self.library
            .method_store
            .add_method(class_ty, Header::Function(def_data.name), rhs_term.term);

        if attrs.is_static {
            return;
        }

        //  Methods named after operators also register under the
        //  operator header, so either surface resolves consistently.
        let Term::Abstraction(abstraction) = self.store.get(abstraction_id).clone() else {
            return;
        };
        let name = def_data.name.as_str();

        if let Some(op) = BinaryOperator::from_name(&name) {
            let kind = AbstractionKind::BinaryOperator(op);
            let header = kind.header();
            let op_abstr =
                self.store
                    .make_abstraction(kind, abstraction.inputs, abstraction.outputs);
            let op_term = Self::term(&token, op_abstr);
            self.push_type_equation(TypeEquation::new(op_term, rhs_term.clone()));
            self.library.method_store.add_method(class_ty, header, op_abstr);

            if op.is_relational()
                && let Some(&first) = output_members.first()
            {
                //  Relational operators produce logical.
                let lhs = Self::term(&token, first);
                let rhs = Self::term(&token, self.library.logical_type);
                self.push_type_equation(TypeEquation::new(lhs, rhs));
            }
        } else if let Some(op) = UnaryOperator::from_name(&name) {
            let kind = AbstractionKind::UnaryOperator(op);
            let header = kind.header();
            let op_abstr =
                self.store
                    .make_abstraction(kind, abstraction.inputs, abstraction.outputs);
            let op_term = Self::term(&token, op_abstr);
            self.push_type_equation(TypeEquation::new(op_term, rhs_term.clone()));
            self.library.method_store.add_method(class_ty, header, op_abstr);
        }
    }

    fn class_def_node(&mut self, node: &ClassDefNode) {
        let class_ty = self.require_local_class_type(node.def);

        let superclasses: Vec<TypeId> = self
            .hir
            .class(node.def)
            .superclasses
            .clone()
            .into_iter()
            .map(|def| self.require_local_class_type(def))
            .collect();
        if let Term::Class(class) = self.store.get_mut(class_ty) {
            class.supertypes.extend(superclasses);
        }

        //  Property initializers constrain their record field types.
        for property in &node.properties {
            let Some(initializer) = &property.initializer else {
                continue;
            };
            let Some(field_ty) = self.class_property_type(class_ty, property.name) else {
                continue;
            };
            let init_term = self.visit_expr(initializer);
            let field_term = Self::term(&property.source_token, field_ty);
            self.push_type_equation(TypeEquation::new(init_term, field_term));
        }

        self.class_state.push(Some(ClassContext { class_type: class_ty }));
        for method in &node.methods {
            self.function_def_node(method);
        }
        self.class_state.pop();
    }

    fn class_property_type(&self, class_ty: TypeId, name: Ident) -> Option<TypeId> {
        let Term::Class(class) = self.store.get(class_ty) else {
            return None;
        };
        let Term::Record(record) = self.store.get(class.source) else {
            return None;
        };
        record.fields.iter().find_map(|field| {
            match self.store.get(field.name) {
                Term::ConstantValue(ConstantValue::Char(field_name)) if *field_name == name => {
                    Some(field.ty)
                }
                _ => None,
            }
        })
    }

    /*
     * Expressions
     */

    fn expr(&mut self, expr: &Expr) -> TypeEquationTerm {
        match expr {
            Expr::Number { token } => Self::term(token, self.library.double_type),
            Expr::Char { token } => Self::term(token, self.library.char_type),
            Expr::String { token } => Self::term(token, self.library.string_type),
            Expr::ColonSubscript { token } => Self::term(token, self.library.double_type),
            Expr::LiteralFieldReference { token, field } => {
                let constant = self.store.make_constant_char(*field);
                Self::term(token, constant)
            }
            Expr::DynamicFieldReference { token, expr } => {
                //  The computed field expression must be char.
                let field_term = self.visit_expr(expr);
                let char_term = Self::term(token, self.library.char_type);
                self.push_type_equation(TypeEquation::new(field_term.clone(), char_term));
                field_term
            }
            Expr::VariableReference {
                token,
                def,
                subscripts,
            } => self.variable_reference_expr(token, *def, subscripts),
            Expr::FunctionCall {
                token,
                reference,
                args,
            } => self.function_call_expr(token, *reference, args),
            Expr::FunctionReference { token, reference } => {
                self.function_reference_expr(token, *reference)
            }
            Expr::AnonymousFunction {
                token,
                scope,
                inputs,
                body,
            } => self.anonymous_function_expr(token, *scope, inputs, body),
            Expr::BinaryOp {
                token,
                op,
                left,
                right,
            } => {
                let left_term = self.visit_expr(left);
                let right_term = self.visit_expr(right);
                let args = self
                    .store
                    .make_rvalue_destructured_tuple(vec![left_term.term, right_term.term]);
                self.operator_application(token, AbstractionKind::BinaryOperator(*op), args)
            }
            Expr::UnaryOp { token, op, expr } => {
                let operand = self.visit_expr(expr);
                let args = self.store.make_rvalue_destructured_tuple(vec![operand.term]);
                self.operator_application(token, AbstractionKind::UnaryOperator(*op), args)
            }
            Expr::Grouping {
                token,
                method,
                components,
            } => self.grouping_expr(token, *method, components),
        }
    }

    fn operator_application(
        &mut self,
        token: &Token,
        kind: AbstractionKind,
        args: TypeId,
    ) -> TypeEquationTerm {
        let result = self.make_fresh_variable();
        let inputs = self.make_fresh_variable();
        let outputs = self.make_fresh_variable();
        let func = self.store.make_abstraction(kind, inputs, outputs);

        let app = self.store.make_application(func, args, result);
        let app_var = self.make_fresh_variable();
        let lhs = Self::term(token, app_var);
        let rhs = Self::term(token, app);
        self.push_type_equation(TypeEquation::new(lhs, rhs));

        Self::term(token, result)
    }

    fn variable_reference_expr(
        &mut self,
        token: &Token,
        def: VariableDefId,
        subscripts: &[mtx_hir::SubscriptArg],
    ) -> TypeEquationTerm {
        let var_ty = self.require_bound_variable(def);

        if subscripts.is_empty() {
            let usage = if self.is_lhs() {
                Usage::Lvalue
            } else {
                Usage::Rvalue
            };
            let dt = self.store.make_destructured_tuple(usage, vec![var_ty]);
            return Self::term(token, dt);
        }

        //  Subscript arguments are always rvalues, even on an assignment
        //  target.
        self.value_category.push(Side::Rhs);
        let subs: Vec<Sub> = subscripts
            .iter()
            .map(|sub| Sub {
                method: sub.method,
                arguments: sub
                    .arguments
                    .iter()
                    .map(|arg| self.visit_expr(arg).term)
                    .collect(),
            })
            .collect();
        self.value_category.pop();

        let outputs = self.make_fresh_variable();
        let sub_ty = self.store.make_subscript(var_ty, subs, outputs);
        let sub_var = self.make_fresh_variable();
        let lhs = Self::term(token, sub_var);
        let rhs = Self::term(token, sub_ty);
        self.push_type_equation(TypeEquation::new(lhs, rhs));

        Self::term(token, outputs)
    }

    fn function_call_expr(
        &mut self,
        token: &Token,
        reference: FunctionRefId,
        args: &[Expr],
    ) -> TypeEquationTerm {
        let ref_data = self.hir.reference(reference).clone();

        if self.struct_is_constructor()
            && ref_data.name == self.library.special.struct_constructor
            && ref_data.def.is_none()
            && let Some(record) = self.struct_as_constructor(token, args)
        {
            return record;
        }

        let members: Vec<TypeId> = args.iter().map(|arg| self.visit_expr(arg).term).collect();
        let args_ty = self.store.make_rvalue_destructured_tuple(members);
        let result = self.make_fresh_variable();

        let func_ty = if let Some(def) = ref_data.def {
            self.require_local_function_type(def, reference)
        } else {
            let inputs = self.make_fresh_variable();
            let outputs = self.make_fresh_variable();
            self.store.make_abstraction(
                AbstractionKind::function(ref_data.name, Some(reference)),
                inputs,
                outputs,
            )
        };

        let app = self.store.make_application(func_ty, args_ty, result);
        let app_var = self.make_fresh_variable();
        let lhs = Self::term(token, app_var);
        let rhs = Self::term(token, app);
        self.push_type_equation(TypeEquation::new(lhs, rhs));

        Self::term(token, result)
    }

    /// `X = struct('x', some_value(), 'y', other_value())` builds a
    /// record. Returns `None` on a malformed argument list, in which case
    /// the caller falls back to the generic function-call shape.
    fn struct_as_constructor(&mut self, token: &Token, args: &[Expr]) -> Option<TypeEquationTerm> {
        let mut fields: Vec<Field> = Vec::new();
        let mut field_name: Option<Ident> = None;
        let mut expect_char = true;

        for arg in args {
            if expect_char && arg.is_char_literal() {
                let Expr::Char { token: char_token } = arg else {
                    unreachable!();
                };
                let name = Ident::new(&char_token.lexeme);
                if self.has_field(&fields, name) {
                    return None;
                }
                field_name = Some(name);
                expect_char = false;
            } else if !expect_char && field_name.is_some() {
                let name = field_name.take().unwrap();
                let field_ty = self.struct_field_value(arg);
                let name_ty = self.store.make_constant_char(name);
                fields.push(Field {
                    name: name_ty,
                    ty: field_ty,
                });
                expect_char = true;
            } else {
                return None;
            }
        }

        let record = self.store.make_record(fields);
        Some(Self::term(token, record))
    }

    fn has_field(&self, fields: &[Field], name: Ident) -> bool {
        fields.iter().any(|field| {
            matches!(
                self.store.get(field.name),
                Term::ConstantValue(ConstantValue::Char(existing)) if *existing == name
            )
        })
    }

    fn struct_field_value(&mut self, arg: &Expr) -> TypeId {
        //  struct('a', {1, 2, 3}) homogenises the listed values into the
        //  field type; struct('a', {}) yields an empty tuple field.
        if let Expr::Grouping {
            method: GroupingMethod::Brace,
            components,
            token: group_token,
        } = arg
        {
            let members = self.grouping_components(components);
            if members.is_empty() {
                return self.store.make_tuple(Vec::new());
            }
            let first = members[0];
            for &member in &members[1..] {
                let lhs = Self::term(group_token, first);
                let rhs = Self::term(group_token, member);
                self.push_type_equation(TypeEquation::new(lhs, rhs));
            }
            first
        } else {
            self.visit_expr(arg).term
        }
    }

    fn function_reference_expr(
        &mut self,
        token: &Token,
        reference: FunctionRefId,
    ) -> TypeEquationTerm {
        let ref_data = self.hir.reference(reference).clone();

        let inputs = self.make_fresh_variable();
        let outputs = self.make_fresh_variable();
        let func = self.store.make_abstraction(
            AbstractionKind::function(ref_data.name, Some(reference)),
            inputs,
            outputs,
        );

        if let Some(def) = ref_data.def {
            let current = self.require_local_function_type(def, reference);
            let lhs = Self::term(token, current);
            let rhs = if self.functions_are_polymorphic() {
                let scheme = self.store.make_scheme(func, Vec::new());
                Self::term(token, scheme)
            } else {
                Self::term(token, func)
            };
            self.push_type_equation(TypeEquation::new(lhs, rhs));
        }

        Self::term(token, func)
    }

    fn anonymous_function_expr(
        &mut self,
        token: &Token,
        scope: ScopeId,
        inputs: &[Option<VariableDefId>],
        body: &Expr,
    ) -> TypeEquationTerm {
        self.scopes.push(scope);
        self.repositories.push(ConstraintRepository::default());

        let input_members: Vec<TypeId> = inputs
            .iter()
            .map(|input| match input {
                Some(def) => self.require_bound_variable(*def),
                //  Ignored parameter.
                None => self.make_fresh_variable(),
            })
            .collect();
        let input_dt = self.store.make_input_destructured_tuple(input_members);
        let output_ty = self.make_fresh_variable();
        let func = self
            .store
            .make_abstraction(AbstractionKind::Anonymous, input_dt, output_ty);

        self.polymorphic.push(false);
        let body_term = self.visit_expr(body);
        self.polymorphic.pop();

        let output_term = Self::term(token, output_ty);
        self.push_type_equation(TypeEquation::new(body_term, output_term));

        let repository = self.repositories.pop().unwrap();
        let scheme = self.store.make_scheme(func, repository.variables);
        if let Term::Scheme(scheme_term) = self.store.get_mut(scheme) {
            scheme_term.constraints = repository.constraints;
        }

        self.scopes.pop();
        Self::term(token, scheme)
    }

    fn grouping_components(&mut self, components: &[Expr]) -> Vec<TypeId> {
        components
            .iter()
            .map(|component| self.visit_expr(component).term)
            .collect()
    }

    fn grouping_expr(
        &mut self,
        token: &Token,
        method: GroupingMethod,
        components: &[Expr],
    ) -> TypeEquationTerm {
        match method {
            GroupingMethod::Brace => {
                debug_assert!(!self.is_lhs());
                let members = self.grouping_components(components);
                let list = self.store.make_list(members);
                let tuple = self.store.make_tuple(vec![list]);
                Self::term(token, tuple)
            }
            GroupingMethod::Parens => {
                debug_assert!(!self.is_lhs());
                let members = self.grouping_components(components);
                let dt = self.store.make_rvalue_destructured_tuple(members);
                Self::term(token, dt)
            }
            GroupingMethod::Bracket => {
                if self.is_lhs() {
                    let members = self.grouping_components(components);
                    let dt = self.store.make_lvalue_destructured_tuple(members);
                    Self::term(token, dt)
                } else {
                    //  [a, b] in value position concatenates.
                    let members = self.grouping_components(components);
                    let args = self.store.make_rvalue_destructured_tuple(members);
                    self.operator_application(
                        token,
                        AbstractionKind::Concatenation(ConcatenationDirection::Horizontal),
                        args,
                    )
                }
            }
        }
    }
}
